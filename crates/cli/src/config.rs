//! `migrant.toml` configuration file.
//!
//! ```toml
//! migrations_dir = "database/migrations"
//! extension = "php"
//! templates_dir = "resources/migrant"
//! stale_match = "exact"
//! ```
//!
//! Every key is optional. Command-line flags take precedence.

use anyhow::Context;
use migrant_codegen::{GeneratorConfig, StaleMatch};
use migrant_core::GenError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "migrant.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub migrations_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub templates_dir: Option<PathBuf>,
    pub stale_match: Option<StaleMatch>,
}

impl FileConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .map_err(|e| GenError::InvalidConfig(e.message().to_string()))
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load the explicit file, or `./migrant.toml` when it exists.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn into_generator_config(self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new();
        if let Some(dir) = self.migrations_dir {
            config = config.with_migrations_dir(dir);
        }
        if let Some(ext) = self.extension {
            config = config.with_extension(ext);
        }
        if let Some(dir) = self.templates_dir {
            config = config.with_templates_dir(dir);
        }
        if let Some(mode) = self.stale_match {
            config = config.with_stale_match(mode);
        }
        config
    }
}
