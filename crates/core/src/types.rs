//! Core types used throughout Migrant
//!
//! These are the structured records produced by the input parser and
//! consumed by the line renderers. All of them serialize to the same JSON
//! shape accepted by `--parsed`, so one generator invocation can hand its
//! already-parsed records to another.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Column Types
// ============================================================================

/// One chained builder call, e.g. `decimal(5, 2)` or `nullable()`.
///
/// Arguments are kept verbatim, quotes included, and spliced into the
/// generated source as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCall {
    /// Method name
    pub name: String,
    /// Positional arguments, in order
    #[serde(default)]
    pub args: Vec<String>,
}

impl TypeCall {
    /// Create a call with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a call with arguments
    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// A column declaration.
///
/// `calls[0]` is a pseudo-call holding the column name; the real type and
/// modifier calls follow it. A renderable column has at least two calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSpec {
    pub calls: Vec<TypeCall>,
}

impl ColumnSpec {
    /// Start a column with only its name pseudo-call
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            calls: vec![TypeCall::new(name)],
        }
    }

    /// Append a chained call
    pub fn call(mut self, call: TypeCall) -> Self {
        self.calls.push(call);
        self
    }

    /// Column name (the pseudo-call's name)
    pub fn name(&self) -> &str {
        self.calls.first().map(|c| c.name.as_str()).unwrap_or("")
    }

    /// The user-supplied calls, without the name pseudo-call
    pub fn type_calls(&self) -> &[TypeCall] {
        self.calls.get(1..).unwrap_or(&[])
    }
}

// ============================================================================
// Foreign Key Types
// ============================================================================

/// The local column(s) of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyName {
    /// A single column, e.g. `user_id`
    Single(String),
    /// A composite key, e.g. `[tenant_id, user_id]`
    Composite(Vec<String>),
}

impl KeyName {
    /// The column that a missing table name is derived from
    pub fn primary(&self) -> &str {
        match self {
            KeyName::Single(name) => name,
            KeyName::Composite(names) => names.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Column names, in order
    pub fn columns(&self) -> Vec<&str> {
        match self {
            KeyName::Single(name) => vec![name.as_str()],
            KeyName::Composite(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Render as a builder argument: `'a'` or `['a', 'b']`
    pub fn to_argument(&self) -> String {
        match self {
            KeyName::Single(name) => format!("'{}'", name),
            KeyName::Composite(names) => {
                let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
                format!("[{}]", quoted.join(", "))
            }
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyName::Single(name) => write!(f, "{}", name),
            KeyName::Composite(names) => write!(f, "[{}]", names.join(",")),
        }
    }
}

impl From<&str> for KeyName {
    fn from(name: &str) -> Self {
        KeyName::Single(name.to_string())
    }
}

/// A foreign key constraint.
///
/// Absent attributes are `None`; defaults (`column = "id"`, a table derived
/// from the key name) are applied at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySpec {
    pub name: KeyName,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
}

impl ForeignKeySpec {
    /// Create a key with every optional attribute absent
    pub fn new(name: impl Into<KeyName>) -> Self {
        Self {
            name: name.into(),
            column: None,
            table: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the referenced column
    pub fn references(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the referenced table
    pub fn on(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the on-delete action
    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    /// Set the on-update action
    pub fn on_update(mut self, action: impl Into<String>) -> Self {
        self.on_update = Some(action.into());
        self
    }
}

// ============================================================================
// Constraint Events
// ============================================================================

/// Referential event a constraint action is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintEvent {
    Delete,
    Update,
}

impl ConstraintEvent {
    /// Name used in the `on{{event}}` builder call
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintEvent::Delete => "Delete",
            ConstraintEvent::Update => "Update",
        }
    }
}

impl fmt::Display for ConstraintEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
