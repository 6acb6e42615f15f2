//! Error types for the migration runner.

use scoopdb_core::ExecutionError;

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Errors surfaced by the migration runner.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Rendering a log query or mutation failed.
    #[error(transparent)]
    Query(#[from] scoopdb_core::QueryError),

    /// A builder operation on the log table failed.
    #[error(transparent)]
    Builder(#[from] scoopdb_core::Error),

    /// The backend rejected a runner-owned statement (log DDL or
    /// log reads/writes).
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A step's action reported a hard failure.
    #[error("migration step {id} failed")]
    StepFailed {
        /// The failed step's id.
        id: i64,
        /// The failure the action reported.
        #[source]
        source: ExecutionError,
    },

    /// A persisted log row could not be interpreted.
    #[error("malformed migration log row: {0}")]
    MalformedLogRow(String),
}
