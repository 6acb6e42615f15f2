//! # scoopdb-core
//!
//! A schema-aware SQL construction engine for a MySQL-flavored backend.
//!
//! This crate provides:
//! - A per-session [`SchemaCatalog`] caching column metadata by alias
//! - Type-driven value masking that quotes, escapes and coerces literals
//!   according to the target column's metadata
//! - [`QueryBuilder`] for SELECT statements (joins, constraints, unions,
//!   derived DELETE) and [`MutationBuilder`] for INSERT/UPDATE/upsert
//!
//! Rendered statements are plain SQL text handed to an [`Executor`]
//! collaborator; values are masked into literals, not bound parameters.
//!
//! ## Building a query
//!
//! ```rust,no_run
//! use scoopdb_core::{QueryBuilder, SchemaCatalog};
//!
//! # fn demo(catalog: &SchemaCatalog) -> Result<(), scoopdb_core::QueryError> {
//! let sql = QueryBuilder::new(catalog, "orders")?
//!     .equals("status", "open")
//!     .in_values("priority", vec![1, 2])
//!     .sort(&["created DESC"])
//!     .limit(50)
//!     .render()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Masking
//!
//! Literal values are escaped and quoted by column category, so caller
//! input never changes statement structure:
//!
//! ```rust
//! use scoopdb_core::schema::{ColumnMetadata, ColumnType};
//! use scoopdb_core::{mask, Value};
//!
//! let column = ColumnMetadata::new("name", ColumnType::Varchar);
//! let masked = mask(&column, &Value::from("'; DROP TABLE users; --"));
//! assert_eq!(masked, "'\\'; DROP TABLE users; --'");
//! ```

pub mod catalog;
pub mod constraint;
pub mod error;
pub mod exec;
pub mod join;
pub mod mask;
pub mod mutation;
pub mod query;
pub mod schema;
pub mod value;

pub use catalog::{Introspector, SchemaCatalog};
pub use constraint::{Comparison, Constraint};
pub use error::{ConfigError, Error, ExecutionError, QueryError};
pub use exec::{ExecOutcome, Executor, Row};
pub use join::{JoinKind, JoinSource, JoinSpec};
pub use mask::mask;
pub use mutation::{
    insert_from_select, insert_from_select_or_update, MutationBuilder, MutationKind,
    SelectColumnPair,
};
pub use query::{ColumnSelection, QueryBuilder};
pub use schema::{ColumnMetadata, ColumnType, TableSchema, TypeCategory};
pub use value::{escape, Value};
