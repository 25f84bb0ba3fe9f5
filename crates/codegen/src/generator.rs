//! # Migration Generator
//!
//! The `MigrationGenerator` is the top-level entry point. It takes a
//! [`MigrationRequest`] and a [`GeneratorConfig`], renders the migration
//! skeleton, and optionally writes it to the migrations directory.
//!
//! ## Pipeline
//!
//! ```text
//! RawOptions ──► MigrationRequest::from_options()   (parse / JSON)
//!                        │
//!                        ▼
//!               MigrationGenerator::render()         (column, additions,
//!                        │                            constraint blocks)
//!                        ▼
//!               MigrationGenerator::generate()       → MigrationPlan
//!                        │
//!                        ▼
//!               delete_old_migrations() + save_file() → WriteReport
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use migrant_codegen::{GeneratorConfig, MigrationGenerator, MigrationRequest, RawOptions};
//! use migrant_codegen::files::AlwaysOverwrite;
//!
//! let options = RawOptions {
//!     schema: Some("title:string body:text".into()),
//!     add: Some("timestamps".into()),
//!     ..Default::default()
//! };
//! let request = MigrationRequest::from_options("posts", &options)?;
//!
//! let generator = MigrationGenerator::new(GeneratorConfig::default())?;
//! let report = generator.generate_and_write(&request, chrono::Local::now().naive_local(), &AlwaysOverwrite)?;
//! println!("wrote {}", report.outcome.path().display());
//! ```

use chrono::NaiveDateTime;
use migrant_core::{
    CodeGenContext, ColumnSpec, ForeignKeySpec, GenError, GenResult, Validatable,
};
use std::path::PathBuf;

use crate::files::{self, OverwritePrompt, WriteOutcome};
use crate::naming::MigrationName;
use crate::parser::{self, ParseMode, ParsedValue};
use crate::render::{self, CONSTRAINTS_PLACEHOLDER, SCHEMA_PLACEHOLDER};
use crate::template::{MIGRATION, TemplateContext, TemplateSet};
use crate::{GeneratedFile, GeneratorConfig};

// ============================================================================
// Request
// ============================================================================

/// Option strings as they arrive from the command line.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// Schema string (`--schema`)
    pub schema: Option<String>,
    /// Comma-separated additions (`--add`)
    pub add: Option<String>,
    /// Foreign keys string (`--keys`)
    pub keys: Option<String>,
    /// Explicit file name (`--file`)
    pub file: Option<String>,
    /// Options hold JSON records instead of the compact grammar (`--parsed`)
    pub parsed: bool,
}

/// A fully parsed migration request.
///
/// `schema` and `keys` are `None` when the option was not given, which
/// renders a placeholder comment instead of an empty block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationRequest {
    pub table: String,
    pub schema: Option<Vec<ColumnSpec>>,
    pub additionals: Vec<String>,
    pub keys: Option<Vec<ForeignKeySpec>>,
    pub file: Option<String>,
}

impl MigrationRequest {
    /// Create a request with every option absent
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.schema = Some(columns);
        self
    }

    pub fn with_additionals<I, S>(mut self, additionals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.additionals = additionals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keys(mut self, keys: Vec<ForeignKeySpec>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Build a request from raw option strings.
    ///
    /// With `parsed` set, schema, keys and additions are read as JSON;
    /// otherwise schema and keys go through the compact grammar.
    pub fn from_options(table: impl Into<String>, options: &RawOptions) -> GenResult<Self> {
        let raw = |opt: &Option<String>| opt.clone().unwrap_or_default();

        let (schema, keys, additionals) = if options.parsed {
            (
                parser::parse_json_value(&raw(&options.schema), ParseMode::Schema)?,
                parser::parse_json_value(&raw(&options.keys), ParseMode::ForeignKeys)?,
                parser::parse_json_additionals(&raw(&options.add))?,
            )
        } else {
            (
                parser::parse_value(&raw(&options.schema), ParseMode::Schema)?,
                parser::parse_value(&raw(&options.keys), ParseMode::ForeignKeys)?,
                parser::parse_additionals(&raw(&options.add)),
            )
        };

        Ok(Self {
            table: table.into(),
            schema: schema.map(into_columns).transpose()?,
            additionals,
            keys: keys.map(into_keys).transpose()?,
            file: options.file.clone().filter(|f| !f.is_empty()),
        })
    }
}

fn into_columns(value: ParsedValue) -> GenResult<Vec<ColumnSpec>> {
    match value {
        ParsedValue::Columns(columns) => Ok(columns),
        ParsedValue::Keys(_) => Err(GenError::validation("expected column records")),
    }
}

fn into_keys(value: ParsedValue) -> GenResult<Vec<ForeignKeySpec>> {
    match value {
        ParsedValue::Keys(keys) => Ok(keys),
        ParsedValue::Columns(_) => Err(GenError::validation("expected foreign key records")),
    }
}

impl Validatable for MigrationRequest {
    fn validate(&self) -> GenResult<()> {
        if self.table.trim().is_empty() {
            return Err(GenError::validation("Table name cannot be empty"));
        }
        if self.table.contains(['/', '\\']) || self.table.contains("..") {
            return Err(GenError::validation(format!(
                "Invalid table name '{}'",
                self.table
            )));
        }
        for column in self.schema.iter().flatten() {
            column.validate()?;
        }
        for key in self.keys.iter().flatten() {
            key.validate()?;
        }
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

/// A rendered migration and where it will go.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub file: GeneratedFile,
    /// Key identifying stale copies in the migrations directory
    pub stale_key: String,
}

/// What happened when a migration was written.
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub outcome: WriteOutcome,
    /// Stale files removed before writing
    pub deleted: Vec<PathBuf>,
}

// ============================================================================
// MigrationGenerator
// ============================================================================

/// Renders and writes migrations.
///
/// Stateless aside from its configuration and templates.
#[derive(Debug, Clone)]
pub struct MigrationGenerator {
    config: GeneratorConfig,
    templates: TemplateSet,
    ctx: CodeGenContext,
}

impl MigrationGenerator {
    /// Create a generator, loading template overrides if configured.
    pub fn new(config: GeneratorConfig) -> GenResult<Self> {
        let templates = match &config.templates_dir {
            Some(dir) => TemplateSet::from_dir(dir)?,
            None => TemplateSet::builtin(),
        };
        Ok(Self::with_templates(config, templates))
    }

    /// Create a generator with an explicit template set.
    pub fn with_templates(config: GeneratorConfig, templates: TemplateSet) -> Self {
        Self {
            config,
            templates,
            ctx: CodeGenContext::new(),
        }
    }

    /// Render the migration source. Pure: touches no files.
    pub fn render(&self, request: &MigrationRequest) -> GenResult<String> {
        request.validate()?;

        let name = MigrationName::from_table(&request.table);

        let schema = render::build_parameters(
            request.schema.as_deref(),
            SCHEMA_PLACEHOLDER,
            &self.ctx,
            |column| render::column_declaration(column, &self.ctx),
        )?;
        let additionals = render::additionals_declaration(&request.additionals, &self.ctx)?;
        let constraints = render::build_parameters(
            request.keys.as_deref(),
            CONSTRAINTS_PLACEHOLDER,
            &self.ctx,
            |key| render::constraint_declaration(key, &self.templates),
        )?;

        let context: TemplateContext = [
            ("table", request.table.clone()),
            ("name", name.class_base.clone()),
            ("schema", schema),
            ("additionals", additionals),
            ("constraints", constraints),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        self.templates.render(MIGRATION, context)
    }

    /// Render the migration and resolve its output path.
    pub fn generate(&self, request: &MigrationRequest, now: NaiveDateTime) -> GenResult<MigrationPlan> {
        let content = self.render(request)?;

        let name = MigrationName::from_table(&request.table);
        let resolved =
            files::resolve_file_name(&name, request.file.as_deref(), now, self.config.stale_match);
        let path = self
            .config
            .migrations_dir
            .join(format!("{}.{}", resolved.stem, self.config.extension));

        tracing::debug!(
            table = %request.table,
            path = %path.display(),
            stale_key = %resolved.stale_key,
            "migration rendered",
        );

        Ok(MigrationPlan {
            file: GeneratedFile::new(path, content, format!("{} migration", request.table)),
            stale_key: resolved.stale_key,
        })
    }

    /// Generate, delete stale copies, and save.
    ///
    /// Stale files are removed before the new file is written, so running
    /// twice for the same table leaves a single migration behind, including
    /// with an explicit file name.
    pub fn generate_and_write(
        &self,
        request: &MigrationRequest,
        now: NaiveDateTime,
        prompt: &dyn OverwritePrompt,
    ) -> GenResult<WriteReport> {
        let plan = self.generate(request, now)?;

        let deleted = files::delete_old_migrations(
            &self.config.migrations_dir,
            &plan.stale_key,
            self.config.stale_match,
        )?;
        let outcome = files::save_file(&plan.file, self.config.force, prompt)?;

        tracing::info!(
            table = %request.table,
            deleted = deleted.len(),
            written = outcome.is_written(),
            "migration generation complete",
        );

        Ok(WriteReport { outcome, deleted })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::{AlwaysOverwrite, NeverOverwrite, StaleMatch};
    use chrono::NaiveDate;
    use migrant_core::TypeCall;
    use std::fs;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn generator(dir: &std::path::Path) -> MigrationGenerator {
        MigrationGenerator::new(GeneratorConfig::new().with_migrations_dir(dir)).unwrap()
    }

    fn posts_request() -> MigrationRequest {
        let options = RawOptions {
            schema: Some("title:string,body:text".into()),
            add: Some("timestamps".into()),
            keys: Some(String::new()),
            ..Default::default()
        };
        MigrationRequest::from_options("posts", &options).unwrap()
    }

    #[test]
    fn test_from_options_absent_values() {
        let request = MigrationRequest::from_options("posts", &RawOptions::default()).unwrap();
        assert_eq!(request, MigrationRequest::new("posts"));
    }

    #[test]
    fn test_from_options_parsed_json() {
        let options = RawOptions {
            schema: Some(r#"[[{"name":"title"},{"name":"string"}]]"#.into()),
            add: Some(r#"["timestamps","softDeletes"]"#.into()),
            keys: Some(r#"[{"name":"user_id"}]"#.into()),
            parsed: true,
            ..Default::default()
        };
        let request = MigrationRequest::from_options("posts", &options).unwrap();
        assert_eq!(
            request,
            MigrationRequest::new("posts")
                .with_schema(vec![ColumnSpec::new("title").call(TypeCall::new("string"))])
                .with_additionals(["timestamps", "softDeletes"])
                .with_keys(vec![ForeignKeySpec::new("user_id")])
        );
    }

    #[test]
    fn test_render_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let content = generator(dir.path()).render(&posts_request()).unwrap();

        assert!(content.contains("class CreatePostsTable extends Migration"));
        assert!(content.contains("Schema::create('posts', function(Blueprint $table) {"));
        assert!(content.contains("            $table->string('title');\n            $table->text('body');\n"));
        assert!(content.contains("            $table->timestamps();\n"));
        assert!(content.contains("            // Constraints declaration\n"));
        assert!(!content.contains("// Schema declaration"));
        assert!(content.contains("Schema::drop('posts');"));
    }

    #[test]
    fn test_render_with_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let options = RawOptions {
            keys: Some("user_id:::cascade".into()),
            ..Default::default()
        };
        let request = MigrationRequest::from_options("comments", &options).unwrap();
        let content = generator(dir.path()).render(&request).unwrap();

        assert!(content.contains("            // Schema declaration\n"));
        assert!(content.contains(
            "            $table->foreign('user_id')\n                ->references('id')\n                ->on('users')\n                ->onDelete('cascade');\n"
        ));
    }

    #[test]
    fn test_render_rejects_untyped_column() {
        let dir = tempfile::tempdir().unwrap();
        let request = MigrationRequest::new("posts").with_schema(vec![ColumnSpec::new("title")]);
        let err = generator(dir.path()).render(&request).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_render_rejects_bad_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(generator(dir.path()).render(&MigrationRequest::new("")).is_err());
        assert!(generator(dir.path()).render(&MigrationRequest::new("../x")).is_err());
    }

    #[test]
    fn test_generate_paths() {
        let dir = tempfile::tempdir().unwrap();
        let plan = generator(dir.path()).generate(&posts_request(), at(10, 0, 0)).unwrap();
        assert_eq!(
            plan.file.path,
            dir.path().join("2024_03_09_100000_create_posts_table.php")
        );
        assert_eq!(plan.stale_key, "create_posts_table");
        assert_eq!(plan.file.description, "posts migration");

        let plan = generator(dir.path())
            .generate(&posts_request().with_file("posts_fixture"), at(10, 0, 0))
            .unwrap();
        assert_eq!(plan.file.path, dir.path().join("posts_fixture.php"));
    }

    #[test]
    fn test_running_twice_leaves_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());

        let first = generator
            .generate_and_write(&posts_request(), at(10, 0, 0), &AlwaysOverwrite)
            .unwrap();
        assert!(first.deleted.is_empty());

        let second = generator
            .generate_and_write(&posts_request(), at(10, 0, 1), &AlwaysOverwrite)
            .unwrap();
        assert_eq!(second.deleted, vec![first.outcome.path().to_path_buf()]);

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        assert!(second.outcome.path().exists());
    }

    #[test]
    fn test_similar_migration_survives_in_exact_mode() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("2020_01_01_000000_create_posts_archive_table.php");
        fs::write(&archive, "<?php").unwrap();

        generator(dir.path())
            .generate_and_write(&posts_request(), at(10, 0, 0), &AlwaysOverwrite)
            .unwrap();
        assert!(archive.exists());

        let substring = MigrationGenerator::new(
            GeneratorConfig::new()
                .with_migrations_dir(dir.path())
                .with_stale_match(StaleMatch::Substring),
        )
        .unwrap();
        let report = substring
            .generate_and_write(&posts_request(), at(11, 0, 0), &AlwaysOverwrite)
            .unwrap();
        assert!(!archive.exists());
        assert_eq!(report.deleted.len(), 2);
    }

    #[test]
    fn test_explicit_file_replaces_itself() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());
        let target = dir.path().join("fixture.php");

        generator
            .generate_and_write(&posts_request().with_file("fixture"), at(10, 0, 0), &NeverOverwrite)
            .unwrap();

        let request = MigrationRequest::from_options(
            "posts",
            &RawOptions {
                schema: Some("body:text".into()),
                file: Some("fixture".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let report = generator
            .generate_and_write(&request, at(10, 0, 0), &NeverOverwrite)
            .unwrap();

        assert_eq!(report.deleted, vec![target.clone()]);
        assert_eq!(report.outcome, WriteOutcome::Written(target.clone()));
        let content = fs::read_to_string(&target).unwrap();
        assert!(content.contains("$table->text('body');"));
        assert!(!content.contains("$table->string('title');"));
    }

    #[test]
    fn test_same_second_rerun_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let generator = generator(dir.path());

        let first = generator
            .generate_and_write(&posts_request(), at(10, 0, 0), &NeverOverwrite)
            .unwrap();
        let second = generator
            .generate_and_write(&posts_request(), at(10, 0, 0), &NeverOverwrite)
            .unwrap();

        assert_eq!(second.deleted, vec![first.outcome.path().to_path_buf()]);
        assert!(second.outcome.is_written());
    }
}
