#![allow(dead_code)]

use scoopdb_core::{ExecOutcome, ExecutionError, Executor, Row};

/// A scripted backend: answers SELECTs with the configured log rows,
/// everything else with an affected count, and records every statement.
pub struct MockExecutor {
    pub log_rows: Vec<Row>,
    pub executed: Vec<String>,
    pub fail_contains: Option<String>,
}

impl MockExecutor {
    pub fn new(log_rows: Vec<Row>) -> Self {
        Self {
            log_rows,
            executed: Vec::new(),
            fail_contains: None,
        }
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_contains = Some(needle.to_string());
        self
    }

    /// All executed statements containing `needle`.
    pub fn statements_containing(&self, needle: &str) -> Vec<&String> {
        self.executed.iter().filter(|s| s.contains(needle)).collect()
    }
}

impl Executor for MockExecutor {
    fn execute(&mut self, sql: &str) -> Result<ExecOutcome, ExecutionError> {
        self.executed.push(sql.to_string());
        // Log-persist statements (backtick-quoted table right after the verb)
        // are never failed, even when the feedback column echoes a failing
        // statement's text.
        let is_log_persist = sql.starts_with("INSERT INTO `") || sql.starts_with("UPDATE `");
        if let Some(needle) = &self.fail_contains {
            if !is_log_persist && sql.contains(needle.as_str()) {
                return Err(ExecutionError::new(sql, "scripted failure"));
            }
        }
        if sql.starts_with("SELECT") {
            Ok(ExecOutcome::Rows(self.log_rows.clone()))
        } else {
            Ok(ExecOutcome::Affected(1))
        }
    }
}

/// Builds one persisted log row.
pub fn log_row(step_id: i64, status: &str, feedback: &str) -> Row {
    let mut row = Row::new();
    row.insert("step_id".into(), Some(step_id.to_string()));
    row.insert("execution_status".into(), Some(status.into()));
    row.insert("execution_date".into(), Some("2026-08-01 12:00:00".into()));
    row.insert("execution_duration".into(), Some("0.1".into()));
    row.insert("description".into(), Some("prior run".into()));
    row.insert("execution_feedback".into(), Some(feedback.into()));
    row
}
