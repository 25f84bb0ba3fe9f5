//! # Migration Files
//!
//! Resolving the output file name, removing stale migrations for the same
//! table, and saving the rendered file.
//!
//! ## Naming
//!
//! ```text
//! database/migrations/{YYYY_MM_DD_HHMMSS}_create_{table}_table.php
//! ```
//!
//! An explicit file name replaces the whole stem and is used verbatim.

use chrono::NaiveDateTime;
use migrant_core::{GenError, GenResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::GeneratedFile;
use crate::naming::MigrationName;

/// Format of the timestamp prefix (without its trailing `_`).
pub const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";

/// Length of a formatted timestamp prefix, e.g. `2024_01_15_103000`.
const TIMESTAMP_LEN: usize = 17;

// ============================================================================
// Stale matching
// ============================================================================

/// How existing migrations are recognised as stale copies of the new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleMatch {
    /// File stem, minus any timestamp prefix, equals the key.
    #[default]
    Exact,
    /// File name contains the key anywhere. Can remove unrelated files
    /// that happen to share the slug (`create_posts` also matches
    /// `create_posts_archive_table`).
    Substring,
}

impl StaleMatch {
    /// Whether `file_name` is a stale copy for `key`.
    pub fn matches(&self, file_name: &str, key: &str) -> bool {
        match self {
            StaleMatch::Substring => file_name.contains(key),
            StaleMatch::Exact => {
                let stem = Path::new(file_name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(file_name);
                stem == key || file_name == key || strip_timestamp(stem) == Some(key)
            }
        }
    }
}

impl std::str::FromStr for StaleMatch {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(StaleMatch::Exact),
            "substring" => Ok(StaleMatch::Substring),
            other => Err(GenError::InvalidConfig(format!(
                "unknown stale match mode '{}' (expected 'exact' or 'substring')",
                other
            ))),
        }
    }
}

/// The part of `stem` after a `YYYY_MM_DD_HHMMSS_` prefix, if it has one.
pub fn strip_timestamp(stem: &str) -> Option<&str> {
    let prefix = stem.get(..TIMESTAMP_LEN)?;
    let rest = stem.get(TIMESTAMP_LEN..)?.strip_prefix('_')?;
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).ok()?;
    Some(rest)
}

// ============================================================================
// Name resolution
// ============================================================================

/// Output stem and the key used to find stale copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// File name without extension
    pub stem: String,
    /// Name fragment identifying older files for the same migration
    pub stale_key: String,
}

/// Resolve the output file name for a migration.
///
/// An explicit name is used verbatim and is its own stale key. Otherwise the
/// stem is the timestamped file slug; the stale key is the file slug in
/// exact mode and the bare slug (`create_posts`) in substring mode.
pub fn resolve_file_name(
    name: &MigrationName,
    explicit: Option<&str>,
    now: NaiveDateTime,
    mode: StaleMatch,
) -> ResolvedFile {
    if let Some(file) = explicit.filter(|f| !f.is_empty()) {
        return ResolvedFile {
            stem: file.to_string(),
            stale_key: file.to_string(),
        };
    }

    let stale_key = match mode {
        StaleMatch::Exact => name.file_slug(),
        StaleMatch::Substring => name.slug.clone(),
    };

    ResolvedFile {
        stem: format!("{}_{}", now.format(TIMESTAMP_FORMAT), name.file_slug()),
        stale_key,
    }
}

// ============================================================================
// Stale cleanup
// ============================================================================

/// Delete every file directly inside `dir` that matches `key`.
///
/// The scan is not recursive. A missing directory has nothing to delete.
/// The output file of the current run matches too, so it is replaced rather
/// than prompted for. Returns the deleted paths.
pub fn delete_old_migrations(dir: &Path, key: &str, mode: StaleMatch) -> GenResult<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "migrations directory missing, nothing to clean");
        return Ok(Vec::new());
    }

    let mut deleted = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GenError::DirectoryRead {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !mode.matches(&file_name, key) {
            continue;
        }

        std::fs::remove_file(entry.path()).map_err(|e| GenError::FileDelete {
            path: entry.path().to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::info!(path = %entry.path().display(), "deleted stale migration");
        deleted.push(entry.into_path());
    }

    Ok(deleted)
}

// ============================================================================
// Saving
// ============================================================================

/// Decides whether an existing file may be replaced.
pub trait OverwritePrompt {
    /// Ask whether `path`, which already exists, should be overwritten.
    fn confirm_overwrite(&self, path: &Path) -> GenResult<bool>;
}

/// Replaces existing files without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl OverwritePrompt for AlwaysOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> GenResult<bool> {
        Ok(true)
    }
}

/// Never replaces existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl OverwritePrompt for NeverOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> GenResult<bool> {
        Ok(false)
    }
}

/// Result of saving a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written
    Written(PathBuf),
    /// The file existed and the prompt declined to overwrite it
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Written(p) | WriteOutcome::Skipped(p) => p,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written(_))
    }
}

/// Write a generated file, creating parent directories.
///
/// An existing file is only replaced when `force` is set or the prompt
/// agrees.
pub fn save_file(
    file: &GeneratedFile,
    force: bool,
    prompt: &dyn OverwritePrompt,
) -> GenResult<WriteOutcome> {
    let path = &file.path;

    if path.exists() && !force && !prompt.confirm_overwrite(path)? {
        tracing::warn!(path = %path.display(), "{} not overwritten", file.description);
        return Ok(WriteOutcome::Skipped(path.clone()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GenError::DirectoryCreate {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    std::fs::write(path, &file.content).map_err(|e| GenError::FileWrite {
        path: path.clone(),
        message: e.to_string(),
    })?;

    tracing::info!(path = %path.display(), "{} generated", file.description);
    Ok(WriteOutcome::Written(path.clone()))
}

// ============================================================================
// Tests
// ============================================================================
