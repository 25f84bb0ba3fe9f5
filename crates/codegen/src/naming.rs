//! # Naming
//!
//! Case conversion and pluralisation used to derive class names, file
//! slugs, and referenced table names.

use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};
use migrant_core::KeyName;

/// Suffix conventionally carried by foreign key columns.
const KEY_SUFFIX: &str = "_id";

// ====================================================================
// Case helpers
// ====================================================================

/// Convert a name to `snake_case` (e.g. "BlogPost" → "blog_post").
pub fn snake(name: &str) -> String {
    name.to_snake_case()
}

/// Convert a name to `PascalCase` (e.g. "blog_posts" → "BlogPosts").
pub fn pascal(name: &str) -> String {
    name.to_pascal_case()
}

/// Convert a name to `camelCase` (e.g. "blog_posts" → "blogPosts").
pub fn camel(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Singular/plural pairs the suffix rules get wrong.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
    ("datum", "data"),
    ("medium", "media"),
    ("criterion", "criteria"),
];

/// Words with no separate plural form.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "deer",
    "news",
    "metadata",
    "feedback",
];

/// Pluralise a word with simple English heuristics, returning snake_case.
///
/// Only the last `_` segment is inflected (`blog_person` → `blog_people`).
/// Words that already look plural ("users", "categories", "people") are
/// returned unchanged, so pluralising twice is harmless.
pub fn pluralize(word: &str) -> String {
    let s = word.to_snake_case();
    let (head, last) = match s.rfind('_') {
        Some(i) => s.split_at(i + 1),
        None => ("", s.as_str()),
    };

    if UNCOUNTABLE.contains(&last) || IRREGULAR.iter().any(|(_, plural)| *plural == last) {
        return s;
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == last) {
        return format!("{}{}", head, plural);
    }

    if is_plural(&s) {
        s
    } else if s.ends_with('s')
        || s.ends_with('x')
        || s.ends_with('z')
        || s.ends_with("ch")
        || s.ends_with("sh")
    {
        format!("{}es", s)
    } else if s.ends_with('y')
        && !s.ends_with("ey")
        && !s.ends_with("ay")
        && !s.ends_with("oy")
        && !s.ends_with("uy")
    {
        format!("{}ies", &s[..s.len() - 1])
    } else {
        format!("{}s", s)
    }
}

fn is_plural(s: &str) -> bool {
    s.ends_with('s') && !s.ends_with("ss") && !s.ends_with("us") && !s.ends_with("is")
}

// ====================================================================
// Table names
// ====================================================================

/// Table referenced by a foreign key that does not name one.
///
/// The `_id` suffix is stripped from the key column and the rest is
/// pluralised (`user_id` → `users`). Composite keys use their first column.
pub fn default_table(name: &KeyName) -> String {
    let column = name.primary();
    let stem = column.strip_suffix(KEY_SUFFIX).unwrap_or(column);
    pluralize(stem)
}

/// Table name as written into a constraint: snake_case plural.
pub fn constraint_table(table: &str) -> String {
    snake(&pluralize(table))
}

// ====================================================================
// Migration names
// ====================================================================

/// Names derived from the table a migration creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationName {
    /// The table as given on the command line
    pub table: String,
    /// `Create<Table>` (e.g. "CreateBlogPosts"); the class is `<base>Table`
    pub class_base: String,
    /// snake_case of `class_base` (e.g. "create_blog_posts")
    pub slug: String,
}

impl MigrationName {
    /// Derive every name from a table name.
    pub fn from_table(table: &str) -> Self {
        let class_base = format!("Create{}", pascal(&camel(table)));
        let slug = snake(&class_base);
        Self {
            table: table.to_string(),
            class_base,
            slug,
        }
    }

    /// Class declared by the migration file (e.g. "CreatePostsTable").
    pub fn class_name(&self) -> String {
        format!("{}Table", self.class_base)
    }

    /// File name without timestamp or extension (e.g. "create_posts_table").
    pub fn file_slug(&self) -> String {
        format!("{}_table", self.slug)
    }
}

// ============================================================================
// Tests
// ============================================================================
