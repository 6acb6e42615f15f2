//! The persisted migration log.
//!
//! One row per step, keyed by the caller-defined step id. The table is
//! created idempotently at the start of every invocation, and all reads
//! and writes go through the regular statement builders against a
//! preloaded catalog, since the log's schema is statically known.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use scoopdb_core::schema::{ColumnMetadata, ColumnType, TableSchema};
use scoopdb_core::{
    Executor, MutationBuilder, MutationKind, QueryBuilder, Row, SchemaCatalog, Value,
};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::step::{StepRecord, StepStatus};

/// Default name of the log table.
pub const DEFAULT_LOG_TABLE: &str = "migration_log";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads and writes step records in the log table.
#[derive(Debug)]
pub struct MigrationLog {
    table: String,
    catalog: SchemaCatalog,
}

impl MigrationLog {
    /// Creates a log bound to `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        let table = table.into();
        let catalog = SchemaCatalog::preloaded([(table.clone(), log_schema(&table))]);
        Self { table, catalog }
    }

    /// The log table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The idempotent DDL creating the log table.
    #[must_use]
    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS `{}` (\n\
             `step_id` INT(11) NOT NULL,\n\
             `execution_status` ENUM('skipped','executed','running'),\n\
             `execution_date` DATETIME,\n\
             `execution_duration` FLOAT,\n\
             `description` TEXT,\n\
             `execution_feedback` TEXT,\n\
             PRIMARY KEY (`step_id`)\n\
             ) ENGINE=InnoDB DEFAULT CHARSET=utf8",
            self.table
        )
    }

    /// Ensures the log table exists.
    pub fn ensure_table(&self, executor: &mut dyn Executor) -> Result<()> {
        executor.execute(&self.create_table_sql())?;
        Ok(())
    }

    /// Loads all persisted step records, keyed by step id.
    pub fn load(&self, executor: &mut dyn Executor) -> Result<HashMap<i64, StepRecord>> {
        let sql = QueryBuilder::new(&self.catalog, &self.table)?.render()?;
        let outcome = executor.execute(&sql)?;
        let rows = outcome.rows().unwrap_or(&[]);

        let mut records = HashMap::with_capacity(rows.len());
        for row in rows {
            let record = parse_record(row)?;
            records.insert(record.step_id, record);
        }
        debug!(table = %self.table, count = records.len(), "loaded migration log");
        Ok(records)
    }

    /// Persists a step record, inserting on first run and updating after.
    pub fn persist(
        &self,
        executor: &mut dyn Executor,
        record: &StepRecord,
        exists: bool,
    ) -> Result<()> {
        let builder = if exists {
            MutationBuilder::with_primary_key(
                &self.catalog,
                &self.table,
                vec![("step_id", Value::from(record.step_id))],
            )?
        } else {
            // step_id is the key but never auto-increments, so it must be
            // assigned explicitly on insert.
            MutationBuilder::new(&self.catalog, &self.table)?
                .set_primary_key("step_id", record.step_id)?
        };

        let builder = builder
            .set("execution_status", record.status.as_str())?
            .set("execution_date", Value::now())?
            .set("execution_duration", record.duration_secs)?
            .set("description", record.description.as_str())?
            .set("execution_feedback", record.feedback.as_str())?;

        let kind = if exists {
            MutationKind::Update
        } else {
            MutationKind::Insert
        };
        if let Some(sql) = builder.render(kind)? {
            executor.execute(&sql)?;
        }
        Ok(())
    }
}

impl Default for MigrationLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TABLE)
    }
}

fn log_schema(table: &str) -> TableSchema {
    TableSchema::new(
        table,
        vec![
            ColumnMetadata::new("step_id", ColumnType::Int)
                .primary_key()
                .length(11),
            ColumnMetadata::new("execution_status", ColumnType::Enum).nullable(),
            ColumnMetadata::new("execution_date", ColumnType::DateTime).nullable(),
            ColumnMetadata::new("execution_duration", ColumnType::Float).nullable(),
            ColumnMetadata::new("description", ColumnType::Blob).nullable(),
            ColumnMetadata::new("execution_feedback", ColumnType::Blob).nullable(),
        ],
    )
}

fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r str> {
    row.get(column).and_then(Option::as_deref)
}

fn parse_record(row: &Row) -> Result<StepRecord> {
    let step_id = cell(row, "step_id")
        .and_then(|v| v.parse::<i64>().ok())
        .ok_or_else(|| MigrateError::MalformedLogRow(format!("bad step_id in {row:?}")))?;

    let status = cell(row, "execution_status")
        .and_then(StepStatus::parse)
        .ok_or_else(|| {
            MigrateError::MalformedLogRow(format!("bad execution_status for step {step_id}"))
        })?;

    let executed_at = cell(row, "execution_date")
        .and_then(|v| NaiveDateTime::parse_from_str(v, DATE_FORMAT).ok())
        .map(|naive| naive.and_utc());

    let duration_secs = cell(row, "execution_duration")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(StepRecord {
        step_id,
        status,
        executed_at,
        duration_secs,
        description: cell(row, "description").unwrap_or_default().to_string(),
        feedback: cell(row, "execution_feedback")
            .unwrap_or_default()
            .to_string(),
    })
}
