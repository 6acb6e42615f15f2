//! Migration step definitions and their persisted counterparts.

use chrono::{DateTime, Utc};
use scoopdb_core::{ExecOutcome, ExecutionError, Executor};
use serde::{Deserialize, Serialize};

/// How a suspended step affects the rest of the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuspendMode {
    /// Stop processing further steps; this step must finish across
    /// subsequent invocations before anything later runs.
    Others,
    /// Leave this step in progress but keep processing later steps.
    Continue,
}

/// What a step's action reports back to the runner.
#[derive(Debug)]
pub enum StepOutcome {
    /// The action finished; the step is done.
    Completed(String),
    /// The action wants another invocation to continue its work.
    Suspended(SuspendMode, String),
    /// The action failed hard; the runner stops and surfaces this.
    Failed(ExecutionError),
}

/// The body of one migration step.
pub enum StepBody {
    /// Raw SQL statements, executed in order.
    Sql(Vec<String>),
    /// A single executable action driven through a [`StepHandle`].
    Action(Box<dyn Fn(&mut StepHandle<'_>) -> StepOutcome>),
}

impl std::fmt::Debug for StepBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sql(statements) => f.debug_tuple("Sql").field(statements).finish(),
            Self::Action(_) => f.write_str("Action(..)"),
        }
    }
}

/// One caller-defined migration step. Steps are processed in the order
/// they are supplied, not sorted by id.
#[derive(Debug)]
pub struct StepDef {
    /// Caller-defined unique id, the log table's primary key.
    pub id: i64,
    /// Human-readable description, persisted alongside the outcome.
    pub description: String,
    /// What the step does.
    pub body: StepBody,
}

impl StepDef {
    /// A step made of raw SQL statements.
    #[must_use]
    pub fn sql<S: Into<String>>(id: i64, description: impl Into<String>, statements: Vec<S>) -> Self {
        Self {
            id,
            description: description.into(),
            body: StepBody::Sql(statements.into_iter().map(Into::into).collect()),
        }
    }

    /// A step backed by an executable action.
    #[must_use]
    pub fn action<F>(id: i64, description: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut StepHandle<'_>) -> StepOutcome + 'static,
    {
        Self {
            id,
            description: description.into(),
            body: StepBody::Action(Box::new(action)),
        }
    }
}

/// Supplies the ordered migration step definitions for a run.
///
/// Implemented by the embedding application; definitions are rebuilt on
/// every call, so an implementation stays stateless.
pub trait StepSource {
    /// Returns every step, in the order they must be processed.
    fn steps(&self) -> Vec<StepDef>;
}

/// Persisted execution state of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Deliberately marked as not to be run.
    Skipped,
    /// Ran to completion.
    Executed,
    /// Started but not finished; re-attempted on the next invocation.
    Running,
}

impl StepStatus {
    /// The enumeration text stored in the log table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Executed => "executed",
            Self::Running => "running",
        }
    }

    /// Parses the stored enumeration text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "skipped" => Some(Self::Skipped),
            "executed" => Some(Self::Executed),
            "running" => Some(Self::Running),
            _ => None,
        }
    }
}

/// One row of the migration log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// The step this row belongs to.
    pub step_id: i64,
    /// Last recorded status.
    pub status: StepStatus,
    /// When the step last ran.
    pub executed_at: Option<DateTime<Utc>>,
    /// Wall time of the last run, in seconds.
    pub duration_secs: f64,
    /// The step's description as of its last run.
    pub description: String,
    /// Accumulated feedback, newest run first.
    pub feedback: String,
}

impl StepRecord {
    /// Whether this step still needs processing.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, StepStatus::Running)
    }
}

/// The narrow capability handed to a step's action: statement execution
/// only, nothing else of the runner's machinery.
pub struct StepHandle<'a> {
    executor: &'a mut dyn Executor,
}

impl<'a> StepHandle<'a> {
    pub(crate) fn new(executor: &'a mut dyn Executor) -> Self {
        Self { executor }
    }

    /// Runs one statement against the backend.
    pub fn execute(&mut self, sql: &str) -> Result<ExecOutcome, ExecutionError> {
        self.executor.execute(sql)
    }
}
