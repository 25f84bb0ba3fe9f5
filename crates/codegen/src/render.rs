//! # Line Renderers
//!
//! Turn parsed records into the builder-call statements spliced into the
//! migration skeleton:
//!
//! ```text
//!             $table->string('title')->nullable();
//!             $table->timestamps();
//!             $table->foreign('user_id')
//!                 ->references('id')
//!                 ->on('users')
//!                 ->onDelete('cascade');
//! ```

use migrant_core::{
    CodeGenContext, CodeGenerable, ColumnSpec, ConstraintEvent, ForeignKeySpec, GenError,
    GenResult, Validatable,
};

use crate::naming;
use crate::template::{FOREIGN_KEY, ON_CONSTRAINT, TemplateSet};

/// Placeholder emitted when no schema was given.
pub const SCHEMA_PLACEHOLDER: &str = "// Schema declaration";

/// Placeholder emitted when no foreign keys were given.
pub const CONSTRAINTS_PLACEHOLDER: &str = "// Constraints declaration";

/// Column a foreign key references when none is named.
pub const DEFAULT_REFERENCED_COLUMN: &str = "id";

// ============================================================================
// Parameter blocks
// ============================================================================

/// Render a template slot from an optional list of records.
///
/// `None` (the option was not given) yields the placeholder comment at the
/// context's indentation. Otherwise every item is rendered in order and the
/// results are joined with newlines.
pub fn build_parameters<T, F>(
    items: Option<&[T]>,
    placeholder: &str,
    ctx: &CodeGenContext,
    render: F,
) -> GenResult<String>
where
    F: FnMut(&T) -> GenResult<String>,
{
    match items {
        None => Ok(format!("{}{}", ctx.indent(), placeholder)),
        Some(items) => Ok(items
            .iter()
            .map(render)
            .collect::<GenResult<Vec<_>>>()?
            .join("\n")),
    }
}

// ============================================================================
// Columns
// ============================================================================

/// A column rendered as one chained statement.
pub struct ColumnDeclaration<'a>(pub &'a ColumnSpec);

impl CodeGenerable for ColumnDeclaration<'_> {
    fn generate(&self, ctx: &CodeGenContext) -> GenResult<String> {
        let column = self.0;
        column.validate()?;

        let Some((first, rest)) = column.type_calls().split_first() else {
            return Err(GenError::field_validation(column.name(), "missing column type"));
        };

        let mut first = first.clone();
        first.args.insert(0, format!("'{}'", column.name()));

        let chain: String = std::iter::once(&first)
            .chain(rest)
            .map(|call| format!("->{}({})", call.name, call.args.join(", ")))
            .collect();

        Ok(format!("{}{}{};", ctx.indent(), ctx.builder_variable, chain))
    }
}

/// Render one column statement, e.g. `$table->string('title');`.
pub fn column_declaration(column: &ColumnSpec, ctx: &CodeGenContext) -> GenResult<String> {
    ColumnDeclaration(column).generate(ctx)
}

// ============================================================================
// Constraints
// ============================================================================

/// A foreign key rendered through the constraint templates.
pub struct ConstraintDeclaration<'a> {
    pub key: &'a ForeignKeySpec,
    pub templates: &'a TemplateSet,
}

impl ConstraintDeclaration<'_> {
    fn modifier(&self, event: ConstraintEvent, action: &str) -> GenResult<String> {
        self.templates
            .render_fragment(ON_CONSTRAINT, [("event", event.as_str()), ("action", action)])
    }
}

impl CodeGenerable for ConstraintDeclaration<'_> {
    fn generate(&self, _ctx: &CodeGenContext) -> GenResult<String> {
        let key = self.key;
        key.validate()?;

        let column = key.column.as_deref().unwrap_or(DEFAULT_REFERENCED_COLUMN);
        let table = match &key.table {
            Some(table) => naming::constraint_table(table),
            None => naming::constraint_table(&naming::default_table(&key.name)),
        };

        let mut constraint = self.templates.render_fragment(
            FOREIGN_KEY,
            [
                ("name", key.name.to_argument()),
                ("table", table),
                ("column", column.to_string()),
            ],
        )?;

        if let Some(action) = &key.on_delete {
            constraint.push('\n');
            constraint.push_str(&self.modifier(ConstraintEvent::Delete, action)?);
        }
        if let Some(action) = &key.on_update {
            constraint.push('\n');
            constraint.push_str(&self.modifier(ConstraintEvent::Update, action)?);
        }

        constraint.push(';');
        Ok(constraint)
    }
}

/// Render one foreign key block, terminated by a single `;`.
pub fn constraint_declaration(key: &ForeignKeySpec, templates: &TemplateSet) -> GenResult<String> {
    ConstraintDeclaration { key, templates }.generate_default()
}

// ============================================================================
// Additionals
// ============================================================================

/// A zero-argument builder call such as `timestamps()`.
pub struct Additional<'a>(pub &'a str);

impl CodeGenerable for Additional<'_> {
    fn generate(&self, ctx: &CodeGenContext) -> GenResult<String> {
        Ok(format!("{}{}->{}();", ctx.indent(), ctx.builder_variable, self.0))
    }
}

/// Render the additions, one statement per line.
///
/// No additions yields an empty string rather than a placeholder.
pub fn additionals_declaration(additionals: &[String], ctx: &CodeGenContext) -> GenResult<String> {
    Ok(additionals
        .iter()
        .map(|name| Additional(name).generate(ctx))
        .collect::<GenResult<Vec<_>>>()?
        .join("\n"))
}

// ============================================================================
// Tests
// ============================================================================
