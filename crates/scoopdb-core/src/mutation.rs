//! INSERT / UPDATE / upsert statement builder.
//!
//! Assignments are collected as raw values and masked through the target
//! column's metadata at render time. Primary key columns are special: a
//! plain assignment to one is rejected, the explicit PK setter must be
//! used, and unassigned non-auto-increment PK values are synthesized into
//! the assignment list of INSERT variants.

use std::fmt::Write as _;

use crate::catalog::SchemaCatalog;
use crate::error::{ConfigError, Error, QueryError};
use crate::join::JoinSpec;
use crate::mask::mask;
use crate::query::QueryBuilder;
use crate::value::Value;

/// The statement shape a mutation renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// `UPDATE ... SET ... WHERE <pk>`.
    Update,
    /// `INSERT INTO ... SET ...`.
    Insert,
    /// `INSERT IGNORE INTO ... SET ...`.
    InsertIgnore,
    /// `INSERT INTO ... SET ... ON DUPLICATE KEY UPDATE ...`.
    InsertOrUpdate,
}

/// Builds a single-row mutation against a schema catalog.
#[derive(Debug)]
pub struct MutationBuilder<'a> {
    catalog: &'a SchemaCatalog,
    table: String,
    joins: Vec<JoinSpec>,
    /// Primary key columns with their values, if known. Auto-discovered
    /// keys start without a value; UPDATE requires all of them resolved.
    pk_columns: Vec<(String, Option<Value>)>,
    assignments: Vec<(String, Value)>,
}

impl<'a> MutationBuilder<'a> {
    /// Starts a mutation of `table`, auto-discovering its primary key
    /// columns from metadata. Discovered keys carry no value, so an
    /// UPDATE built this way needs [`Self::with_primary_key`] instead.
    pub fn new(catalog: &'a SchemaCatalog, table: impl Into<String>) -> Result<Self, QueryError> {
        let table = table.into();
        let schema = catalog.fetch_columns(&table, None)?;
        let pk_columns = schema
            .primary_key_columns()
            .map(|c| (c.name.clone(), None))
            .collect();
        Ok(Self {
            catalog,
            table,
            joins: Vec::new(),
            pk_columns,
            assignments: Vec::new(),
        })
    }

    /// Starts a mutation of `table` with an explicit primary key mapping,
    /// the form required for UPDATE.
    pub fn with_primary_key(
        catalog: &'a SchemaCatalog,
        table: impl Into<String>,
        keys: Vec<(&str, Value)>,
    ) -> Result<Self, QueryError> {
        let table = table.into();
        catalog.fetch_columns(&table, None)?;
        for (column, _) in &keys {
            // Surface typos before any statement is rendered.
            catalog.column(&table, column)?;
        }
        Ok(Self {
            catalog,
            pk_columns: keys
                .into_iter()
                .map(|(column, value)| (column.to_string(), Some(value)))
                .collect(),
            table,
            joins: Vec::new(),
            assignments: Vec::new(),
        })
    }

    /// The mutation target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Adds a join, loading the joined alias's column metadata.
    pub fn join(mut self, spec: JoinSpec) -> Result<Self, QueryError> {
        self.catalog
            .fetch_columns(spec.table(), Some(spec.alias()))?;
        self.joins.push(spec);
        Ok(self)
    }

    fn is_pk(&self, column: &str) -> bool {
        self.pk_columns.iter().any(|(name, _)| name == column)
    }

    /// Assigns `value` to a non-key column.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Result<Self, Error> {
        if self.is_pk(column) {
            return Err(ConfigError::PrimaryKeyAssignment {
                table: self.table.clone(),
                column: column.to_string(),
            }
            .into());
        }
        self.catalog.column(&self.table, column)?;
        self.assignments.push((column.to_string(), value.into()));
        Ok(self)
    }

    /// Assigns several non-key columns at once.
    pub fn set_values<V: Into<Value>>(
        mut self,
        values: Vec<(&str, V)>,
    ) -> Result<Self, Error> {
        for (column, value) in values {
            self = self.set(column, value)?;
        }
        Ok(self)
    }

    /// Assigns the current timestamp to a column.
    pub fn set_now(self, column: &str) -> Result<Self, Error> {
        self.set(column, Value::now())
    }

    /// Assigns a value to a primary key column explicitly.
    ///
    /// The column joins the regular assignment list, so INSERT synthesis
    /// will not generate a second pair for it.
    pub fn set_primary_key(mut self, column: &str, value: impl Into<Value>) -> Result<Self, Error> {
        self.catalog.column(&self.table, column)?;
        self.assignments.push((column.to_string(), value.into()));
        Ok(self)
    }

    fn assignment_sql(&self, column: &str, value: &Value) -> Result<String, QueryError> {
        let metadata = self.catalog.column(&self.table, column)?;
        Ok(format!(
            "`{}`.`{column}` = {}",
            self.table,
            mask(&metadata, value)
        ))
    }

    /// PK-equality pairs for columns not excluded by `skip`.
    fn pk_pairs(
        &self,
        skip_auto_increment: bool,
        skip_assigned: bool,
    ) -> Result<Vec<String>, Error> {
        let mut pairs = Vec::new();
        for (column, value) in &self.pk_columns {
            if skip_assigned && self.assignments.iter().any(|(c, _)| c == column) {
                continue;
            }
            if skip_auto_increment {
                let metadata = self.catalog.column(&self.table, column)?;
                if metadata.auto_increment {
                    continue;
                }
            }
            let Some(value) = value else {
                if skip_assigned {
                    // INSERT synthesis has nothing to emit for a valueless key.
                    continue;
                }
                return Err(ConfigError::MissingPrimaryKey {
                    table: self.table.clone(),
                }
                .into());
            };
            pairs.push(self.assignment_sql(column, value)?);
        }
        Ok(pairs)
    }

    /// Renders the statement for `kind`.
    ///
    /// Returns `Ok(None)` for an UPDATE with no assignments, which is a
    /// deliberate no-op rather than an error.
    pub fn render(&self, kind: MutationKind) -> Result<Option<String>, Error> {
        let mut set_parts = Vec::with_capacity(self.assignments.len() + 1);
        let mut duplicate_parts = Vec::new();
        for (column, value) in &self.assignments {
            let part = self.assignment_sql(column, value)?;
            if !self.is_pk(column) {
                duplicate_parts.push(part.clone());
            }
            set_parts.push(part);
        }

        let verb = match kind {
            MutationKind::Update => {
                if set_parts.is_empty() {
                    return Ok(None);
                }
                "UPDATE"
            }
            MutationKind::Insert | MutationKind::InsertOrUpdate => "INSERT INTO",
            MutationKind::InsertIgnore => "INSERT IGNORE INTO",
        };

        if kind != MutationKind::Update {
            let mut synthesized = self.pk_pairs(true, true)?;
            synthesized.append(&mut set_parts);
            set_parts = synthesized;
        }

        let mut sql = format!("{verb} `{}`", self.table);
        for join in &self.joins {
            let _ = write!(sql, "\n{}", join.render(self.catalog, &self.table)?);
        }
        let _ = write!(sql, "\nSET {}", set_parts.join(", "));

        match kind {
            MutationKind::Update => {
                let conditions = self.pk_pairs(false, false)?;
                if conditions.is_empty() {
                    return Err(ConfigError::MissingPrimaryKey {
                        table: self.table.clone(),
                    }
                    .into());
                }
                let _ = write!(sql, "\nWHERE {}", conditions.join(" AND "));
            }
            MutationKind::InsertOrUpdate if !duplicate_parts.is_empty() => {
                let _ = write!(
                    sql,
                    "\nON DUPLICATE KEY UPDATE {}",
                    duplicate_parts.join(", ")
                );
            }
            _ => {}
        }

        Ok(Some(sql))
    }
}

/// One source→target column pairing for [`insert_from_select_or_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectColumnPair {
    /// Projection expression in the source query.
    pub source: String,
    /// Column name in the target table.
    pub target: String,
    /// Excludes the pair from the ON DUPLICATE KEY UPDATE list.
    pub insert_only: bool,
}

impl SelectColumnPair {
    /// A pairing that is both inserted and updated on key conflicts.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            insert_only: false,
        }
    }

    /// A pairing only used when inserting, never on conflict updates.
    #[must_use]
    pub fn insert_only(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            insert_only: true,
        }
    }
}

/// Renders an `INSERT INTO target (columns) SELECT ...` statement from a
/// prepared query. The query's own projection supplies the source values.
pub fn insert_from_select(
    query: &QueryBuilder<'_>,
    target_table: &str,
    target_columns: &[&str],
) -> Result<String, QueryError> {
    Ok(format!(
        "INSERT INTO `{target_table}` ({})\n{}",
        target_columns.join(", "),
        query.render()?
    ))
}

/// Renders an insert-from-select with an ON DUPLICATE KEY UPDATE clause
/// mapping each non-insert-only source expression onto its target column.
/// The query's projection is replaced by the pairs' source expressions.
pub fn insert_from_select_or_update(
    query: &QueryBuilder<'_>,
    target_table: &str,
    columns: &[SelectColumnPair],
    ignore_duplicate_errors: bool,
) -> Result<String, QueryError> {
    let sources: Vec<&str> = columns.iter().map(|c| c.source.as_str()).collect();
    let targets: Vec<&str> = columns.iter().map(|c| c.target.as_str()).collect();
    let duplicate_parts: Vec<String> = columns
        .iter()
        .filter(|c| !c.insert_only)
        .map(|c| format!("{} = {}", c.target, c.source))
        .collect();

    let verb = if ignore_duplicate_errors {
        "INSERT IGNORE INTO"
    } else {
        "INSERT INTO"
    };

    let mut sql = format!(
        "{verb} `{target_table}` ({})\n{}",
        targets.join(", "),
        query.render_with_projection(&sources.join(", "))?
    );

    if !duplicate_parts.is_empty() {
        let _ = write!(sql, "\nON DUPLICATE KEY UPDATE\n{}", duplicate_parts.join(", "));
    }

    Ok(sql)
}
