//! The migration runner.
//!
//! Drives caller-defined steps against the backend, one invocation at a
//! time. A step runs at most once to completion; a step left `running`
//! (by a suspend signal) is re-attempted on the next invocation. The
//! cumulative time budget is checked between steps only.

use std::time::{Duration, Instant};

use scoopdb_core::Executor;
use tracing::{debug, info, warn};

use crate::error::{MigrateError, Result};
use crate::log::MigrationLog;
use crate::step::{
    StepBody, StepDef, StepHandle, StepOutcome, StepRecord, StepSource, StepStatus, SuspendMode,
};

/// Default cumulative time budget per invocation.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(300);

/// Executes pending migration steps and maintains the log.
pub struct MigrationRunner<E: Executor> {
    executor: E,
    steps: Vec<StepDef>,
    log: MigrationLog,
    budget: Duration,
}

impl<E: Executor> MigrationRunner<E> {
    /// Creates a runner over `steps`, processed in the given order.
    #[must_use]
    pub fn new(executor: E, steps: Vec<StepDef>) -> Self {
        Self {
            executor,
            steps,
            log: MigrationLog::default(),
            budget: DEFAULT_TIME_BUDGET,
        }
    }

    /// Creates a runner over the steps supplied by `source`.
    #[must_use]
    pub fn from_source(executor: E, source: &dyn StepSource) -> Self {
        Self::new(executor, source.steps())
    }

    /// Overrides the per-invocation time budget.
    #[must_use]
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Stores the log in `table` instead of the default.
    #[must_use]
    pub fn log_table(mut self, table: impl Into<String>) -> Self {
        self.log = MigrationLog::new(table);
        self
    }

    /// Gives back the executor, consuming the runner.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Runs one invocation: ensures the log table exists, processes every
    /// pending step in definition order, and returns how many steps were
    /// processed (completed or left `running`).
    pub fn execute(&mut self) -> Result<usize> {
        let invocation_start = Instant::now();

        self.log.ensure_table(&mut self.executor)?;
        let records = self.log.load(&mut self.executor)?;

        let mut processed = 0;
        for step in &self.steps {
            let prior = records.get(&step.id);
            // Executed and skipped steps are settled for good; absent and
            // running ones are pending.
            if prior.is_some_and(|r| !r.is_pending()) {
                continue;
            }

            info!(step = step.id, description = %step.description, "processing migration step");
            let step_start = Instant::now();
            let mut status = StepStatus::Executed;
            let mut stop_after = false;
            let mut feedback_parts: Vec<String> = Vec::new();

            match &step.body {
                StepBody::Sql(statements) => {
                    for sql in statements {
                        let line = match self.executor.execute(sql) {
                            Ok(outcome) => format!(
                                "Executed SQL in {:.3}s with result: {}. Statement: {sql}",
                                step_start.elapsed().as_secs_f64(),
                                describe_outcome(&outcome),
                            ),
                            // A rejected statement is recorded, not fatal;
                            // later statements of the step still run.
                            Err(err) => {
                                warn!(step = step.id, error = %err, "statement failed");
                                format!("Failed SQL: {}. Statement: {sql}", err.message)
                            }
                        };
                        feedback_parts.push(line);
                    }
                }
                StepBody::Action(action) => {
                    let mut handle = StepHandle::new(&mut self.executor);
                    match action(&mut handle) {
                        StepOutcome::Completed(result) => {
                            feedback_parts
                                .push(format!("Executed action with result: {result}"));
                        }
                        StepOutcome::Suspended(mode, result) => {
                            status = StepStatus::Running;
                            stop_after = mode == SuspendMode::Others;
                            feedback_parts.push(format!("Suspended action: {result}"));
                        }
                        StepOutcome::Failed(source) => {
                            // Leave the step resumable before surfacing.
                            persist_outcome(
                                &self.log,
                                &mut self.executor,
                                step,
                                prior,
                                StepStatus::Running,
                                step_start,
                                vec![format!("Failed action: {}", source.message)],
                            )?;
                            return Err(MigrateError::StepFailed {
                                id: step.id,
                                source,
                            });
                        }
                    }
                }
            }

            persist_outcome(
                &self.log,
                &mut self.executor,
                step,
                prior,
                status,
                step_start,
                feedback_parts,
            )?;
            processed += 1;

            if stop_after {
                info!(
                    step = step.id,
                    elapsed = ?invocation_start.elapsed(),
                    "stopping invocation on suspend signal"
                );
                break;
            }
            if invocation_start.elapsed() > self.budget {
                warn!(
                    elapsed = ?invocation_start.elapsed(),
                    budget = ?self.budget,
                    "time budget exceeded, pausing invocation"
                );
                break;
            }
        }

        debug!(processed, "migration invocation finished");
        Ok(processed)
    }
}

#[allow(clippy::too_many_arguments)]
fn persist_outcome(
    log: &MigrationLog,
    executor: &mut dyn Executor,
    step: &StepDef,
    prior: Option<&StepRecord>,
    status: StepStatus,
    step_start: Instant,
    feedback_parts: Vec<String>,
) -> Result<()> {
    let mut feedback = feedback_parts.join("\n");
    // Feedback accumulates newest-first across runs of the same step.
    if let Some(previous) = prior.filter(|r| !r.feedback.is_empty()) {
        feedback.push('\n');
        feedback.push_str(&previous.feedback);
    }

    let record = StepRecord {
        step_id: step.id,
        status,
        executed_at: None,
        duration_secs: step_start.elapsed().as_secs_f64(),
        description: step.description.clone(),
        feedback,
    };
    log.persist(executor, &record, prior.is_some())
}

impl<E: Executor> std::fmt::Debug for MigrationRunner<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("steps", &self.steps.len())
            .field("log_table", &self.log.table())
            .field("budget", &self.budget)
            .finish()
    }
}

fn describe_outcome(outcome: &scoopdb_core::ExecOutcome) -> String {
    match outcome {
        scoopdb_core::ExecOutcome::Rows(rows) => format!("{} row(s)", rows.len()),
        scoopdb_core::ExecOutcome::Affected(count) => format!("{count} affected"),
    }
}
