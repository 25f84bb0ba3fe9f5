//! Error types for Migrant
//!
//! This module provides unified error handling across the generator,
//! including parse errors, template errors, IO errors, and more.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Migrant
#[derive(Debug, Error)]
pub enum GenError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// The compact schema / keys grammar could not be parsed
    #[error("Failed to parse {what} '{input}' at position {position}: {message}")]
    Parse {
        what: String,
        input: String,
        position: usize,
        message: String,
    },

    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Column validation failed
    #[error("Column validation failed for '{column}': {message}")]
    FieldValidation { column: String, message: String },

    // ========================================================================
    // Template Errors
    // ========================================================================
    /// Template id is not registered
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Template rendering failed
    #[error("Template rendering failed for '{template}': {message}")]
    TemplateRender { template: String, message: String },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// File delete error
    #[error("Failed to delete file '{path}': {message}")]
    FileDelete { path: PathBuf, message: String },

    /// Directory scan failed
    #[error("Failed to read directory '{path}': {message}")]
    DirectoryRead { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error (pre-parsed input)
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Interaction Errors
    // ========================================================================
    /// Terminal prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Operation cancelled by user
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl GenError {
    /// Create a parse error
    pub fn parse(
        what: impl Into<String>,
        input: impl Into<String>,
        position: usize,
        msg: impl Into<String>,
    ) -> Self {
        GenError::Parse {
            what: what.into(),
            input: input.into(),
            position,
            message: msg.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        GenError::Validation(msg.into())
    }

    /// Create a column validation error
    pub fn field_validation(column: impl Into<String>, msg: impl Into<String>) -> Self {
        GenError::FieldValidation {
            column: column.into(),
            message: msg.into(),
        }
    }

    /// Create a template rendering error
    pub fn template(template: impl Into<String>, msg: impl Into<String>) -> Self {
        GenError::TemplateRender {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        GenError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error comes from user input (grammar or validation)
    pub fn is_input(&self) -> bool {
        matches!(
            self,
            GenError::Parse { .. }
                | GenError::Validation(_)
                | GenError::FieldValidation { .. }
                | GenError::JsonSerialization(_)
        )
    }

    /// Check if this error is a template error
    pub fn is_template(&self) -> bool {
        matches!(
            self,
            GenError::TemplateNotFound(_) | GenError::TemplateRender { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            GenError::Io(_)
                | GenError::FileWrite { .. }
                | GenError::FileDelete { .. }
                | GenError::DirectoryRead { .. }
                | GenError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using GenError
pub type GenResult<T> = Result<T, GenError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> GenResult<T>;
}

impl<T, E: Into<GenError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> GenResult<T> {
        self.map_err(|e| {
            let err: GenError = e.into();
            GenError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
