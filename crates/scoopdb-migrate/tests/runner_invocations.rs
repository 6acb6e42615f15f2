//! End-to-end runner invocations against a scripted backend.

mod common;
use common::*;

use std::time::Duration;

use scoopdb_migrate::{
    MigrateError, MigrationRunner, StepDef, StepOutcome, StepSource, SuspendMode,
};

fn sql_step(id: i64, description: &str) -> StepDef {
    StepDef::sql(
        id,
        description,
        vec![format!("UPDATE orders SET note = 'step {id}'")],
    )
}

#[test]
fn fresh_run_processes_every_step_and_logs_executed() {
    let steps = vec![
        sql_step(10, "A"),
        StepDef::action(20, "B", |_| StepOutcome::Completed("done".into())),
    ];
    let mut runner = MigrationRunner::new(MockExecutor::new(vec![]), steps);

    assert_eq!(runner.execute().unwrap(), 2);

    let exec = runner.into_executor();
    // The log table is created before anything else.
    assert!(exec.executed[0].starts_with("CREATE TABLE IF NOT EXISTS `migration_log`"));
    let inserts = exec.statements_containing("INSERT INTO `migration_log`");
    assert_eq!(inserts.len(), 2);
    assert!(inserts[0].contains("`migration_log`.`step_id` = 10"));
    assert!(inserts[0].contains("'executed'"));
    assert!(inserts[1].contains("`migration_log`.`step_id` = 20"));
    assert!(inserts[1].contains("'executed'"));
}

#[test]
fn executed_steps_are_left_untouched() {
    let steps = vec![sql_step(10, "A"), sql_step(20, "B")];
    let executor = MockExecutor::new(vec![log_row(10, "executed", "old")]);
    let mut runner = MigrationRunner::new(executor, steps);

    assert_eq!(runner.execute().unwrap(), 1);

    let exec = runner.into_executor();
    assert!(exec
        .statements_containing("UPDATE `migration_log`")
        .is_empty());
    let inserts = exec.statements_containing("INSERT INTO `migration_log`");
    assert_eq!(inserts.len(), 1);
    assert!(inserts[0].contains("`step_id` = 20"));
}

#[test]
fn running_step_is_reattempted_and_feedback_accumulates() {
    let steps = vec![
        StepDef::action(10, "A", |_| {
            StepOutcome::Suspended(SuspendMode::Continue, "more to do".into())
        }),
        sql_step(20, "B"),
    ];
    let executor = MockExecutor::new(vec![log_row(10, "running", "first pass")]);
    let mut runner = MigrationRunner::new(executor, steps);

    // Suspend-continue advances to the next pending step.
    assert_eq!(runner.execute().unwrap(), 2);

    let exec = runner.into_executor();
    let updates = exec.statements_containing("UPDATE `migration_log`");
    assert_eq!(updates.len(), 1);
    assert!(updates[0].contains("'running'"));
    // New feedback first, prior run's feedback appended beneath it.
    assert!(updates[0].contains("Suspended action: more to do\\nfirst pass"));
    // Step 20 ran in the same invocation.
    assert_eq!(
        exec.statements_containing("INSERT INTO `migration_log`").len(),
        1
    );
}

#[test]
fn suspend_others_stops_the_invocation() {
    let steps = vec![
        StepDef::action(10, "A", |_| {
            StepOutcome::Suspended(SuspendMode::Others, "blocked".into())
        }),
        sql_step(20, "B"),
    ];
    let mut runner = MigrationRunner::new(MockExecutor::new(vec![]), steps);

    assert_eq!(runner.execute().unwrap(), 1);

    let exec = runner.into_executor();
    // The suspended step is persisted, the later step never touched.
    assert_eq!(exec.statements_containing("`step_id` = 10").len(), 1);
    assert!(exec.statements_containing("step 20").is_empty());
    assert!(exec.statements_containing("`step_id` = 20").is_empty());
}

#[test]
fn failed_action_is_persisted_running_and_surfaced() {
    let steps = vec![StepDef::action(10, "A", |handle| {
        match handle.execute("UPDATE orders SET broken = 1") {
            Ok(_) => StepOutcome::Completed("unexpected".into()),
            Err(err) => StepOutcome::Failed(err),
        }
    })];
    let executor = MockExecutor::new(vec![]).failing_on("broken");
    let mut runner = MigrationRunner::new(executor, steps);

    let err = runner.execute().unwrap_err();
    assert!(matches!(err, MigrateError::StepFailed { id: 10, .. }));

    let exec = runner.into_executor();
    let persisted = exec.statements_containing("`step_id` = 10");
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].contains("'running'"));
}

#[test]
fn failed_sql_statement_is_recorded_without_halting() {
    let steps = vec![StepDef::sql(
        10,
        "A",
        vec![
            "UPDATE orders SET broken = 1",
            "UPDATE orders SET note = 'after'",
        ],
    )];
    let executor = MockExecutor::new(vec![]).failing_on("broken");
    let mut runner = MigrationRunner::new(executor, steps);

    assert_eq!(runner.execute().unwrap(), 1);

    let exec = runner.into_executor();
    // The second statement still ran.
    assert_eq!(exec.statements_containing("note = 'after'").len(), 1);
    let inserts = exec.statements_containing("INSERT INTO `migration_log`");
    assert!(inserts[0].contains("'executed'"));
    assert!(inserts[0].contains("Failed SQL"));
}

#[test]
fn exhausted_time_budget_pauses_between_steps() {
    let steps = vec![sql_step(10, "A"), sql_step(20, "B")];
    let mut runner =
        MigrationRunner::new(MockExecutor::new(vec![]), steps).time_budget(Duration::ZERO);

    assert_eq!(runner.execute().unwrap(), 1);

    let exec = runner.into_executor();
    assert!(exec.statements_containing("`step_id` = 20").is_empty());
}

#[test]
fn step_source_supplies_definitions() {
    struct AppMigrations;
    impl StepSource for AppMigrations {
        fn steps(&self) -> Vec<StepDef> {
            vec![sql_step(10, "A"), sql_step(20, "B")]
        }
    }

    let mut runner = MigrationRunner::from_source(MockExecutor::new(vec![]), &AppMigrations);
    assert_eq!(runner.execute().unwrap(), 2);
}

#[test]
fn custom_log_table_is_used_everywhere() {
    let steps = vec![sql_step(10, "A")];
    let mut runner =
        MigrationRunner::new(MockExecutor::new(vec![]), steps).log_table("schema_steps");

    assert_eq!(runner.execute().unwrap(), 1);

    let exec = runner.into_executor();
    assert!(exec.executed[0].starts_with("CREATE TABLE IF NOT EXISTS `schema_steps`"));
    assert!(exec.statements_containing("`migration_log`").is_empty());
    assert_eq!(
        exec.statements_containing("INSERT INTO `schema_steps`").len(),
        1
    );
}
