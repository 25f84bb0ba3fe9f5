//! # Migrant CLI
//!
//! Command-line interface for Migrant.
//!
//! ## Commands
//!
//! - `migration` - Generate a create-table migration
//! - `parse` - Show how a schema or keys string is parsed
//!
//! ## Example
//!
//! ```bash
//! migrant migration posts \
//!     --schema="title:string:unique body:text published_at:timestamp:nullable" \
//!     --add=timestamps,softDeletes \
//!     --keys="user_id:id:users:cascade"
//! ```

pub mod commands;
pub mod config;
pub mod prompt;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::{MigrationArgs, ParseArgs};

// Re-export dependencies for use in main.rs
pub use migrant_codegen;
pub use migrant_core;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Debug, Parser)]
#[command(
    name = "migrant",
    about = "Generate Lumen/Laravel schema migrations from compact column descriptions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to ./migrant.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a migration creating a table
    Migration(MigrationArgs),

    /// Parse a schema or foreign keys string and print the records as JSON
    Parse(ParseArgs),
}

impl Cli {
    /// Log filter matching the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Run the parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = config::FileConfig::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Migration(args) => commands::migration(args, file_config),
        Commands::Parse(args) => commands::parse(args),
    }
}
