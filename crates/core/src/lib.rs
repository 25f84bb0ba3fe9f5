//! # Migrant Core
//!
//! Core types, traits, and error handling for Migrant.
//!
//! This crate provides the foundational building blocks shared by the
//! generator and the command line:
//!
//! - **Types**: Parsed records (`ColumnSpec`, `ForeignKeySpec`, `TypeCall`)
//! - **Traits**: Common behaviors like `Validatable` and `CodeGenerable`
//! - **Errors**: Unified error handling with `GenError` and `GenResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{GenError, GenResult, ResultExt};
pub use traits::{CodeGenContext, CodeGenerable, Validatable};
pub use types::{ColumnSpec, ConstraintEvent, ForeignKeySpec, KeyName, TypeCall};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
