//! # Templates
//!
//! Minimal `{{ placeholder }}` substitution plus the set of templates a
//! migration is assembled from.
//!
//! The built-in templates are embedded at compile time. A templates
//! directory can override any of them with `<dir>/<id>.wnt`, e.g.
//! `<dir>/migration/foreign-key.wnt`.

use migrant_core::{GenError, GenResult, ResultExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Migration skeleton (slots: name, table, schema, additionals, constraints)
pub const MIGRATION: &str = "migration";
/// Foreign key declaration (slots: name, table, column)
pub const FOREIGN_KEY: &str = "migration/foreign-key";
/// On delete / on update modifier (slots: event, action)
pub const ON_CONSTRAINT: &str = "migration/on-constraint";

/// Extension of template files on disk.
pub const TEMPLATE_EXTENSION: &str = "wnt";

const BUILTIN: &[(&str, &str)] = &[
    (MIGRATION, include_str!("../templates/migration.wnt")),
    (FOREIGN_KEY, include_str!("../templates/migration/foreign-key.wnt")),
    (ON_CONSTRAINT, include_str!("../templates/migration/on-constraint.wnt")),
];

/// Values substituted into one template render.
pub type TemplateContext = HashMap<String, String>;

// ============================================================================
// Template
// ============================================================================

/// A template source bound to its placeholder values.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    id: &'a str,
    source: &'a str,
    context: TemplateContext,
}

impl<'a> Template<'a> {
    /// Create a template with an empty context
    pub fn new(id: &'a str, source: &'a str) -> Self {
        Self {
            id,
            source,
            context: TemplateContext::new(),
        }
    }

    /// Add placeholder values
    pub fn with<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.context
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Substitute every placeholder.
    ///
    /// A placeholder without a value, or an unclosed `{{`, is an error.
    pub fn render(&self) -> GenResult<String> {
        let mut out = String::with_capacity(self.source.len() + 256);
        let mut rest = self.source;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| {
                GenError::template(
                    self.id,
                    format!(
                        "unclosed placeholder at byte {}",
                        self.source.len() - rest.len() + open
                    ),
                )
            })?;
            let key = after[..close].trim();
            let value = self.context.get(key).ok_or_else(|| {
                GenError::template(self.id, format!("no value for placeholder '{}'", key))
            })?;
            out.push_str(value);
            rest = &after[close + 2..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

// ============================================================================
// TemplateSet
// ============================================================================

/// The templates available to the generator, keyed by id.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    sources: HashMap<String, String>,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateSet {
    /// The embedded templates
    pub fn builtin() -> Self {
        Self {
            sources: BUILTIN
                .iter()
                .map(|(id, src)| (id.to_string(), src.to_string()))
                .collect(),
        }
    }

    /// Built-in templates, overridden by any `<dir>/<id>.wnt` that exists.
    pub fn from_dir(dir: impl AsRef<Path>) -> GenResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GenError::InvalidConfig(format!(
                "templates directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut set = Self::builtin();
        for (id, _) in BUILTIN {
            let path = Self::template_path(dir, id);
            if path.is_file() {
                let source = std::fs::read_to_string(&path)
                    .with_context(format!("Reading template '{}'", path.display()))?;
                tracing::debug!(template = id, path = %path.display(), "using template override");
                set.insert(*id, source);
            }
        }
        Ok(set)
    }

    /// Path a template id is loaded from under `dir`
    pub fn template_path(dir: &Path, id: &str) -> PathBuf {
        dir.join(format!("{}.{}", id, TEMPLATE_EXTENSION))
    }

    /// Register or replace a template
    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(id.into(), source.into());
    }

    /// Look up a template by id
    pub fn get(&self, id: &str) -> GenResult<Template<'_>> {
        let (id, source) = self
            .sources
            .get_key_value(id)
            .ok_or_else(|| GenError::TemplateNotFound(id.to_string()))?;
        Ok(Template::new(id, source))
    }

    /// Render a template with the given context
    pub fn render(&self, id: &str, context: TemplateContext) -> GenResult<String> {
        self.get(id)?.with(context).render()
    }

    /// Render a single-statement fragment, dropping the template's trailing
    /// newline so fragments can be joined line by line.
    pub fn render_fragment<I, K, V>(&self, id: &str, values: I) -> GenResult<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let rendered = self.get(id)?.with(values).render()?;
        Ok(rendered.trim_end_matches(['\r', '\n']).to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_placeholders() {
        let out = Template::new("t", "Hello {{name}}, {{ name }} {{  greeting}}!")
            .with([("name", "Ada"), ("greeting", "welcome")])
            .render()
            .unwrap();
        assert_eq!(out, "Hello Ada, Ada welcome!");
    }

    #[test]
    fn test_missing_value_is_error() {
        let err = Template::new("t", "{{ nope }}").render().unwrap_err();
        assert!(err.is_template());
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_unclosed_placeholder_is_error() {
        let err = Template::new("t", "abc {{ name").with([("name", "x")]).render().unwrap_err();
        assert!(err.to_string().contains("unclosed placeholder at byte 4"));
    }

    #[test]
    fn test_builtin_fragments() {
        let set = TemplateSet::builtin();
        let fk = set
            .render_fragment(
                FOREIGN_KEY,
                [("name", "'user_id'"), ("table", "users"), ("column", "id")],
            )
            .unwrap();
        assert_eq!(
            fk,
            "            $table->foreign('user_id')\n                ->references('id')\n                ->on('users')"
        );

        let on = set
            .render_fragment(ON_CONSTRAINT, [("event", "Delete"), ("action", "cascade")])
            .unwrap();
        assert_eq!(on, "                ->onDelete('cascade')");
    }

    #[test]
    fn test_unknown_template() {
        let set = TemplateSet::builtin();
        assert!(matches!(set.get("nope"), Err(GenError::TemplateNotFound(_))));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("migration")).unwrap();
        std::fs::write(
            TemplateSet::template_path(dir.path(), ON_CONSTRAINT),
            "->on{{event}}(\"{{action}}\")\n",
        )
        .unwrap();

        let set = TemplateSet::from_dir(dir.path()).unwrap();
        let on = set
            .render_fragment(ON_CONSTRAINT, [("event", "Update"), ("action", "restrict")])
            .unwrap();
        assert_eq!(on, "->onUpdate(\"restrict\")");

        // untouched templates fall back to the built-in ones
        assert!(set.get(MIGRATION).unwrap().render().is_err());
    }

    #[test]
    fn test_missing_directory() {
        let err = TemplateSet::from_dir("/definitely/not/here").unwrap_err();
        assert!(matches!(err, GenError::InvalidConfig(_)));
    }
}
