//! The statement execution seam.
//!
//! The engine renders SQL text; something else runs it. `Executor` is the
//! narrow interface the core expects from that collaborator: one statement
//! in, rows or an affected count out. Implementations are synchronous and
//! are expected to serialize access themselves if shared.

use std::collections::HashMap;

use crate::error::ExecutionError;

/// One result row, keyed by column name. Cell values arrive as backend
/// text; `None` is SQL NULL.
pub type Row = HashMap<String, Option<String>>;

/// What a statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// A row set from a SELECT-like statement.
    Rows(Vec<Row>),
    /// The affected-row count of a data manipulation statement.
    Affected(u64),
}

impl ExecOutcome {
    /// Returns the rows, if this outcome is a row set.
    #[must_use]
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Affected(_) => None,
        }
    }

    /// Returns the affected-row count, if any.
    #[must_use]
    pub const fn affected(&self) -> Option<u64> {
        match self {
            Self::Rows(_) => None,
            Self::Affected(n) => Some(*n),
        }
    }
}

/// Executes a single SQL statement against the backend.
///
/// A failed statement is reported once and never retried by the core.
pub trait Executor {
    /// Runs one statement and returns its outcome.
    fn execute(&mut self, sql: &str) -> Result<ExecOutcome, ExecutionError>;
}
