//! Core traits for Migrant
//!
//! This module defines the traits shared by the parsed records: validation
//! before rendering, and code generation into builder-call source text.

use crate::error::{GenError, GenResult};
use crate::types::{ColumnSpec, ForeignKeySpec};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `GenError` describing the problem.
    fn validate(&self) -> GenResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Validatable for ColumnSpec {
    fn validate(&self) -> GenResult<()> {
        if self.name().is_empty() {
            return Err(GenError::validation("Column name cannot be empty"));
        }
        if self.type_calls().is_empty() {
            return Err(GenError::field_validation(
                self.name(),
                "column needs at least one type call (e.g. 'title:string')",
            ));
        }
        if let Some(call) = self.type_calls().iter().find(|c| c.name.is_empty()) {
            return Err(GenError::field_validation(
                self.name(),
                format!("empty method name in call with args {:?}", call.args),
            ));
        }
        Ok(())
    }
}

impl Validatable for ForeignKeySpec {
    fn validate(&self) -> GenResult<()> {
        let columns = self.name.columns();
        if columns.is_empty() || columns.iter().any(|c| c.is_empty()) {
            return Err(GenError::validation(format!(
                "Foreign key '{}' has an empty column name",
                self.name
            )));
        }
        Ok(())
    }
}

// ============================================================================
// CodeGenerable Trait
// ============================================================================

/// Context passed to code generation methods
#[derive(Debug, Clone)]
pub struct CodeGenContext {
    /// Indentation level (number of indent units)
    pub indent_level: usize,
    /// Number of spaces per indent level
    pub spaces_per_indent: usize,
    /// Variable the builder calls are chained on (e.g. `$table`)
    pub builder_variable: String,
}

impl Default for CodeGenContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenContext {
    /// Context for statements inside the `Schema::create` closure:
    /// 12 spaces deep, chained on `$table`.
    pub fn new() -> Self {
        Self {
            indent_level: 3,
            spaces_per_indent: 4,
            builder_variable: "$table".to_string(),
        }
    }

    /// Get the current indentation string
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_level * self.spaces_per_indent)
    }
}

/// Trait for types that can generate code
///
/// # Example
///
/// ```rust,ignore
/// use migrant_core::{CodeGenerable, CodeGenContext, GenResult};
///
/// struct Marker(String);
///
/// impl CodeGenerable for Marker {
///     fn generate(&self, ctx: &CodeGenContext) -> GenResult<String> {
///         Ok(format!("{}{}->{}();", ctx.indent(), ctx.builder_variable, self.0))
///     }
/// }
/// ```
pub trait CodeGenerable {
    /// Generate code for this type
    fn generate(&self, ctx: &CodeGenContext) -> GenResult<String>;

    /// Generate code with default context
    fn generate_default(&self) -> GenResult<String> {
        self.generate(&CodeGenContext::new())
    }
}

// ============================================================================
// Tests
// ============================================================================
