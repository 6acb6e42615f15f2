//! Error types for the query construction engine.
//!
//! The taxonomy separates build-time misuse (`QueryError`), builder
//! misconfiguration (`ConfigError`) and backend rejections
//! (`ExecutionError`). Build-time errors surface before any statement is
//! handed to the execution collaborator.

/// A backend rejection, carrying the statement that was refused.
///
/// Statements are never retried; the caller decides what to do with the
/// original SQL and the backend's error text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("backend rejected statement: {message} (sql: {sql})")]
pub struct ExecutionError {
    /// The SQL text that was submitted.
    pub sql: String,
    /// The backend's error message.
    pub message: String,
}

impl ExecutionError {
    /// Creates a new execution error.
    pub fn new(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while assembling or rendering a statement.
///
/// Every variant names the offending table/column so a caller can correct
/// the builder call without backend access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// LIKE/NOT LIKE used on a column outside the text fieldset.
    #[error("LIKE only works on text columns (`{table}`.`{column}`)")]
    LikeOnNonText {
        /// Table or alias the column belongs to.
        table: String,
        /// The non-text column.
        column: String,
    },

    /// BETWEEN/NOT BETWEEN with a value count other than two.
    #[error("BETWEEN on `{table}`.`{column}` needs exactly 2 values, got {got}")]
    BetweenArity {
        /// Table or alias the column belongs to.
        table: String,
        /// The constrained column.
        column: String,
        /// Number of values supplied.
        got: usize,
    },

    /// IN with an empty value list.
    #[error("IN on `{table}`.`{column}` needs at least one value")]
    EmptyValueList {
        /// Table or alias the column belongs to.
        table: String,
        /// The constrained column.
        column: String,
    },

    /// A column that does not exist in the cached table schema.
    #[error("unknown column `{column}` on `{table}`")]
    UnknownColumn {
        /// Table or alias that was consulted.
        table: String,
        /// The missing column.
        column: String,
    },

    /// An alias with no cached column metadata.
    #[error("no column metadata cached for alias `{alias}`")]
    UnknownAlias {
        /// The unresolved alias.
        alias: String,
    },

    /// The introspection collaborator failed for a table.
    #[error("failed to introspect table `{table}`")]
    Introspection {
        /// The table that could not be introspected.
        table: String,
        /// The underlying backend error.
        #[source]
        source: ExecutionError,
    },

    /// Metadata was requested from a catalog without an introspector.
    #[error("catalog has no introspector to load table `{table}`")]
    NoIntrospector {
        /// The table that would need loading.
        table: String,
    },
}

/// Builder misconfiguration detected before rendering or execution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An UPDATE was prepared without resolvable primary key values.
    #[error("cannot update `{table}` without a resolvable primary key")]
    MissingPrimaryKey {
        /// The mutation target table.
        table: String,
    },

    /// A plain assignment targeted a primary key column.
    #[error("column `{column}` of `{table}` is a primary key; use set_primary_key")]
    PrimaryKeyAssignment {
        /// The mutation target table.
        table: String,
        /// The rejected column.
        column: String,
    },
}

/// Umbrella error for operations that can fail across the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Statement assembly/rendering failure.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Builder misconfiguration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backend rejection.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
