//! # Migrant Codegen
//!
//! Migration generation engine for Migrant.
//!
//! This crate turns a table name plus compact column, addition and foreign
//! key descriptions into a Lumen/Laravel schema migration file.
//!
//! ## Features
//!
//! - **Input Grammar**: `title:string:unique amount:decimal.5.2` and
//!   `user_id:id:users:cascade` style strings, or pre-parsed JSON
//! - **Line Rendering**: chained `$table->…` statements per column, addition
//!   and constraint
//! - **Templates**: embedded skeletons with optional on-disk overrides
//! - **File Handling**: timestamped names and stale migration cleanup
//!

// ============================================================================
// Modules
// ============================================================================

pub mod files;
pub mod generator;
pub mod naming;
pub mod parser;
pub mod render;
pub mod template;

// ============================================================================
// Re-exports
// ============================================================================

pub use files::{OverwritePrompt, StaleMatch, WriteOutcome};
pub use generator::{MigrationGenerator, MigrationPlan, MigrationRequest, RawOptions, WriteReport};
pub use parser::{ParseMode, ParsedValue, parse_value};
pub use template::TemplateSet;

use std::path::PathBuf;

/// Default directory migrations are written to.
pub const DEFAULT_MIGRATIONS_DIR: &str = "./database/migrations";

/// Default extension of generated migration files.
pub const DEFAULT_EXTENSION: &str = "php";

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the migration generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Directory migrations are written to and cleaned in
    pub migrations_dir: PathBuf,

    /// Extension of the generated file, without the dot
    pub extension: String,

    /// Whether to overwrite existing files without asking
    pub force: bool,

    /// How stale migrations for the same table are recognised
    pub stale_match: StaleMatch,

    /// Directory with template overrides
    pub templates_dir: Option<PathBuf>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from(DEFAULT_MIGRATIONS_DIR),
            extension: DEFAULT_EXTENSION.to_string(),
            force: false,
            stale_match: StaleMatch::default(),
            templates_dir: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the migrations directory
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the generated file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Allow overwriting existing files
    pub fn allow_overwrite(mut self) -> Self {
        self.force = true;
        self
    }

    /// Set the stale matching mode
    pub fn with_stale_match(mut self, mode: StaleMatch) -> Self {
        self.stale_match = mode;
        self
    }

    /// Load template overrides from a directory
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// A rendered file waiting to be saved
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Destination path
    pub path: PathBuf,

    /// File content
    pub content: String,

    /// Human-readable label used in confirmations (e.g. "posts migration")
    pub description: String,
}

impl GeneratedFile {
    /// Create a new generated file
    pub fn new(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            description: description.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
