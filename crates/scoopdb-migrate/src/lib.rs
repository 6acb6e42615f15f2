//! Resumable, idempotent database migrations.
//!
//! `scoopdb-migrate` runs a caller-defined, ordered list of migration
//! steps against a backend and records each step's outcome in a log
//! table, so every step runs at most once to completion:
//! - A step is raw SQL statements or an executable action.
//! - Actions can cooperatively **suspend**, splitting long work across
//!   invocations: the step stays `running` and is re-attempted next time.
//! - A cumulative time budget pauses the invocation between steps.
//!
//! # Example
//!
//! ```rust,ignore
//! use scoopdb_migrate::prelude::*;
//!
//! let steps = vec![
//!     StepDef::sql(10, "widen status column", vec![
//!         "ALTER TABLE orders MODIFY status VARCHAR(64)",
//!     ]),
//!     StepDef::action(20, "backfill totals", |handle| {
//!         match handle.execute("UPDATE orders SET total = 0 WHERE total IS NULL") {
//!             Ok(_) => StepOutcome::Completed("backfilled".into()),
//!             Err(err) => StepOutcome::Failed(err),
//!         }
//!     }),
//! ];
//!
//! let mut runner = MigrationRunner::new(executor, steps);
//! let processed = runner.execute()?;
//! ```

pub mod error;
pub mod log;
pub mod runner;
pub mod step;

pub use error::{MigrateError, Result};
pub use log::{MigrationLog, DEFAULT_LOG_TABLE};
pub use runner::{MigrationRunner, DEFAULT_TIME_BUDGET};
pub use step::{
    StepBody, StepDef, StepHandle, StepOutcome, StepRecord, StepSource, StepStatus, SuspendMode,
};

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use crate::error::{MigrateError, Result};
    pub use crate::log::MigrationLog;
    pub use crate::runner::MigrationRunner;
    pub use crate::step::{
        StepBody, StepDef, StepHandle, StepOutcome, StepRecord, StepSource, StepStatus,
        SuspendMode,
    };
}
