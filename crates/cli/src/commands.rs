//! Command implementations.

use anyhow::Context;
use clap::Args;
use colored::Colorize;
use migrant_codegen::{
    GeneratorConfig, MigrationGenerator, MigrationRequest, ParseMode, RawOptions, StaleMatch,
    WriteOutcome, parse_value,
};
use std::path::PathBuf;

use crate::config::FileConfig;
use crate::prompt::DialoguerPrompt;

// ============================================================================
// migration
// ============================================================================

#[derive(Debug, Args)]
pub struct MigrationArgs {
    /// The table name
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// The schema, e.g. "title:string:unique amount:decimal.5.2:default.0"
    #[arg(long)]
    pub schema: Option<String>,

    /// Additional columns: timestamps, softDeletes, rememberToken, nullableTimestamps
    #[arg(long)]
    pub add: Option<String>,

    /// Foreign keys, e.g. "user_id author_id:id:people:cascade"
    #[arg(long)]
    pub keys: Option<String>,

    /// Name of the migration file, without extension (skips the timestamp)
    #[arg(long)]
    pub file: Option<String>,

    /// Options are already parsed and given as JSON
    #[arg(long)]
    pub parsed: bool,

    /// Override existing files without asking
    #[arg(long)]
    pub force: bool,

    /// Migrations directory
    #[arg(long, value_name = "DIR", env = "MIGRANT_MIGRATIONS_DIR")]
    pub path: Option<PathBuf>,

    /// Extension of the generated file
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Directory with template overrides (<DIR>/migration.wnt, ...)
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// How stale migrations are matched: exact or substring
    #[arg(long, value_name = "MODE")]
    pub stale_match: Option<StaleMatch>,
}

impl MigrationArgs {
    /// Generator configuration: defaults, then the file, then flags.
    pub fn generator_config(&self, file: FileConfig) -> GeneratorConfig {
        let mut config = file.into_generator_config();
        if let Some(dir) = &self.path {
            config = config.with_migrations_dir(dir);
        }
        if let Some(ext) = &self.extension {
            config = config.with_extension(ext);
        }
        if let Some(dir) = &self.templates {
            config = config.with_templates_dir(dir);
        }
        if let Some(mode) = self.stale_match {
            config = config.with_stale_match(mode);
        }
        if self.force {
            config = config.allow_overwrite();
        }
        config
    }

    fn raw_options(&self) -> RawOptions {
        RawOptions {
            schema: self.schema.clone(),
            add: self.add.clone(),
            keys: self.keys.clone(),
            file: self.file.clone(),
            parsed: self.parsed,
        }
    }
}

/// Generate one migration and report what changed on disk.
pub fn migration(args: MigrationArgs, file_config: FileConfig) -> anyhow::Result<()> {
    let config = args.generator_config(file_config);
    let generator = MigrationGenerator::new(config).context("Failed to set up the generator")?;

    let request = MigrationRequest::from_options(&args.table, &args.raw_options())
        .with_context(|| format!("Invalid options for table '{}'", args.table))?;

    let now = chrono::Local::now().naive_local();
    let report = generator
        .generate_and_write(&request, now, &DialoguerPrompt::new())
        .with_context(|| format!("Failed to generate the {} migration", args.table))?;

    for path in &report.deleted {
        println!("{} {}", "Removed stale migration:".yellow(), path.display());
    }

    match &report.outcome {
        WriteOutcome::Written(path) => println!(
            "{} {} generated: {}",
            "✔".green().bold(),
            args.table,
            path.display()
        ),
        WriteOutcome::Skipped(path) => println!(
            "{} {} already exists, not overwritten",
            "!".yellow().bold(),
            path.display()
        ),
    }

    Ok(())
}

// ============================================================================
// parse
// ============================================================================

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// What the input describes: schema or keys
    #[arg(value_name = "MODE")]
    pub mode: ParseMode,

    /// The string to parse
    #[arg(value_name = "INPUT", allow_hyphen_values = true)]
    pub input: String,
}

/// Print the records an input string parses to.
pub fn parse(args: ParseArgs) -> anyhow::Result<()> {
    match parse_value(&args.input, args.mode)? {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            eprintln!(
                "{}",
                format!("{} {} record(s)", value.record_count(), args.mode.label()).dimmed()
            );
        }
        None => println!("{}", format!("no {} given", args.mode.label()).dimmed()),
    }
    Ok(())
}
