//! SELECT statement builder.
//!
//! Assembles SELECT text from a validated base table, joins, constraints,
//! grouping, ordering, limits and unions. Rendering is pure: `render` can
//! be called repeatedly and always produces the same statement.

use std::fmt::Write as _;

use crate::catalog::SchemaCatalog;
use crate::constraint::{Comparison, Constraint};
use crate::error::QueryError;
use crate::join::JoinSpec;
use crate::value::Value;

/// One projected column or expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    table: Option<String>,
    expr: SelectExpr,
    output_alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectExpr {
    Column(String),
    Expression(String),
}

impl ColumnSelection {
    fn render(&self, default_table: &str) -> String {
        let rendered = match &self.expr {
            SelectExpr::Column(column) => {
                let table = self.table.as_deref().unwrap_or(default_table);
                format!("`{table}`.`{column}`")
            }
            SelectExpr::Expression(expression) => expression.clone(),
        };
        match &self.output_alias {
            Some(alias) => format!("{rendered} AS `{alias}`"),
            None => rendered,
        }
    }
}

/// EXPLAIN prefix modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExplainMode {
    Off,
    Plain,
    Extended,
}

/// Builds a SELECT statement against a schema catalog.
///
/// The base table's metadata is loaded at construction; each join loads
/// the joined alias. Constraints are ANDed in insertion order.
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    catalog: &'a SchemaCatalog,
    table: String,
    joins: Vec<JoinSpec>,
    constraints: Vec<Constraint>,
    projection: Vec<ColumnSelection>,
    group_by: Vec<String>,
    sort: Option<String>,
    limit_from: u64,
    limit_to: Option<u64>,
    unions: Vec<QueryBuilder<'a>>,
    explain: ExplainMode,
    no_cache: bool,
}

impl<'a> QueryBuilder<'a> {
    /// Starts a query over `table`, loading its column metadata.
    pub fn new(catalog: &'a SchemaCatalog, table: impl Into<String>) -> Result<Self, QueryError> {
        let table = table.into();
        catalog.fetch_columns(&table, None)?;
        Ok(Self {
            catalog,
            table,
            joins: Vec::new(),
            constraints: Vec::new(),
            projection: Vec::new(),
            group_by: Vec::new(),
            sort: None,
            limit_from: 0,
            limit_to: None,
            unions: Vec::new(),
            explain: ExplainMode::Off,
            no_cache: false,
        })
    }

    /// The base table of this query.
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

    fn compare(
        mut self,
        table: Option<&str>,
        column: &str,
        op: Comparison,
        values: Vec<Value>,
    ) -> Self {
        self.constraints.push(Constraint::Compare {
            table: table.unwrap_or(&self.table).to_string(),
            column: column.to_string(),
            op,
            values,
        });
        self
    }

    /// Constrains a base-table column to equal `value`.
    #[must_use]
    pub fn equals(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(None, column, Comparison::Eq, vec![value.into()])
    }

    /// Constrains a column of `table` to equal `value`.
    #[must_use]
    pub fn equals_of(self, table: &str, column: &str, value: impl Into<Value>) -> Self {
        let table = table.to_string();
        self.compare(Some(&table), column, Comparison::Eq, vec![value.into()])
    }

    /// Constrains a base-table column to differ from `value`.
    #[must_use]
    pub fn not_equals(self, column: &str, value: impl Into<Value>) -> Self {
        self.compare(None, column, Comparison::NotEq, vec![value.into()])
    }

    /// Constrains a base-table column to one of `values`. A single value
    /// renders as plain equality.
    #[must_use]
    pub fn in_values<V: Into<Value>>(self, column: &str, values: Vec<V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(None, column, Comparison::In, values)
    }

    /// Constrains a column of `table` to one of `values`.
    #[must_use]
    pub fn in_values_of<V: Into<Value>>(self, table: &str, column: &str, values: Vec<V>) -> Self {
        let table = table.to_string();
        let values = values.into_iter().map(Into::into).collect();
        self.compare(Some(&table), column, Comparison::In, values)
    }

    /// Constrains a base-table column to an inclusive range.
    #[must_use]
    pub fn between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.compare(
            None,
            column,
            Comparison::Between,
            vec![low.into(), high.into()],
        )
    }

    /// Excludes an inclusive range on a base-table column.
    #[must_use]
    pub fn not_between(self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.compare(
            None,
            column,
            Comparison::NotBetween,
            vec![low.into(), high.into()],
        )
    }

    /// Requires a base-table column to be NULL.
    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.compare(None, column, Comparison::IsNull, Vec::new())
    }

    /// Requires a base-table column to be non-NULL.
    #[must_use]
    pub fn is_not_null(self, column: &str) -> Self {
        self.compare(None, column, Comparison::IsNotNull, Vec::new())
    }

    /// Requires a base-table column to be NULL or the empty string.
    #[must_use]
    pub fn is_blank_or_null(self, column: &str) -> Self {
        self.compare(None, column, Comparison::NullOrEmpty, Vec::new())
    }

    /// Requires a column of `table` to be NULL.
    #[must_use]
    pub fn is_null_of(self, table: &str, column: &str) -> Self {
        let table = table.to_string();
        self.compare(Some(&table), column, Comparison::IsNull, Vec::new())
    }

    fn like(
        self,
        table: Option<&str>,
        column: &str,
        op: Comparison,
        pattern: String,
    ) -> Result<Self, QueryError> {
        let alias = table.unwrap_or(&self.table).to_string();
        // Reject non-text columns at add time rather than at render.
        let metadata = self.catalog.column(&alias, column)?;
        if metadata.category() != crate::schema::TypeCategory::Text {
            return Err(QueryError::LikeOnNonText {
                table: alias,
                column: column.to_string(),
            });
        }
        Ok(self.compare(Some(&alias), column, op, vec![Value::from(pattern)]))
    }

    /// Constrains a base-table text column with `LIKE`.
    pub fn like_pattern(self, column: &str, pattern: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::Like, pattern.to_string())
    }

    /// Constrains a base-table text column with `NOT LIKE`.
    pub fn not_like_pattern(self, column: &str, pattern: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::NotLike, pattern.to_string())
    }

    /// Requires a text column to start with `prefix`.
    pub fn starts_with(self, column: &str, prefix: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::Like, format!("{prefix}%"))
    }

    /// Requires a text column to end with `suffix`.
    pub fn ends_with(self, column: &str, suffix: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::Like, format!("%{suffix}"))
    }

    /// Requires a text column to contain `needle`.
    pub fn contains_text(self, column: &str, needle: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::Like, format!("%{needle}%"))
    }

    /// Excludes rows whose text column starts with `prefix`.
    pub fn not_starts_with(self, column: &str, prefix: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::NotLike, format!("{prefix}%"))
    }

    /// Excludes rows whose text column ends with `suffix`.
    pub fn not_ends_with(self, column: &str, suffix: &str) -> Result<Self, QueryError> {
        self.like(None, column, Comparison::NotLike, format!("%{suffix}"))
    }

    /// ANDs a raw condition into the WHERE clause, verbatim.
    #[must_use]
    pub fn custom(mut self, condition: impl Into<String>) -> Self {
        self.constraints.push(Constraint::Custom(condition.into()));
        self
    }

    /// ANDs a pre-built constraint. Operator/column legality is checked
    /// at render time.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Projects a base-table column.
    #[must_use]
    pub fn column(self, column: impl Into<String>) -> Self {
        self.column_entry(None, SelectExpr::Column(column.into()), None)
    }

    /// Projects a base-table column under an output alias.
    #[must_use]
    pub fn column_as(self, column: impl Into<String>, output: impl Into<String>) -> Self {
        self.column_entry(None, SelectExpr::Column(column.into()), Some(output.into()))
    }

    /// Projects a column of a joined alias.
    #[must_use]
    pub fn column_of_table(self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.column_entry(Some(table.into()), SelectExpr::Column(column.into()), None)
    }

    /// Projects a column of a joined alias under an output alias.
    #[must_use]
    pub fn column_of_table_as(
        self,
        table: impl Into<String>,
        column: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.column_entry(
            Some(table.into()),
            SelectExpr::Column(column.into()),
            Some(output.into()),
        )
    }

    /// Projects a raw SQL expression.
    #[must_use]
    pub fn column_expression(self, expression: impl Into<String>) -> Self {
        self.column_entry(None, SelectExpr::Expression(expression.into()), None)
    }

    /// Projects a raw SQL expression under an output alias.
    #[must_use]
    pub fn column_expression_as(
        self,
        expression: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.column_entry(
            None,
            SelectExpr::Expression(expression.into()),
            Some(output.into()),
        )
    }

    fn column_entry(
        mut self,
        table: Option<String>,
        expr: SelectExpr,
        output_alias: Option<String>,
    ) -> Self {
        self.projection.push(ColumnSelection {
            table,
            expr,
            output_alias,
        });
        self
    }

    /// Groups by the given `alias.column` (or bare column) expressions.
    #[must_use]
    pub fn group(mut self, columns: &[&str]) -> Self {
        for spec in columns {
            let rendered = match spec.split_once('.') {
                Some((table, column)) => format!("`{table}`.`{column}`"),
                None => format!("`{}`.`{spec}`", self.table),
            };
            self.group_by.push(rendered);
        }
        self
    }

    /// Orders by the given specs, each an `alias.column` or bare column
    /// optionally followed by a direction, e.g. `"created DESC"`.
    #[must_use]
    pub fn sort(mut self, specs: &[&str]) -> Self {
        let rendered: Vec<String> = specs
            .iter()
            .map(|spec| {
                let (path, direction) = match spec.split_once(' ') {
                    Some((path, dir)) => (path, Some(dir)),
                    None => (*spec, None),
                };
                let mut out = match path.split_once('.') {
                    Some((table, column)) => format!("`{table}`.`{column}`"),
                    None => format!("`{}`.`{path}`", self.table),
                };
                if let Some(direction) = direction {
                    let _ = write!(out, " {direction}");
                }
                out
            })
            .collect();
        self.sort = Some(rendered.join(", "));
        self
    }

    /// Sets a raw ORDER BY body, verbatim.
    #[must_use]
    pub fn custom_sort(mut self, order: impl Into<String>) -> Self {
        self.sort = Some(order.into());
        self
    }

    /// Limits the result to `count` rows.
    #[must_use]
    pub fn limit(mut self, count: u64) -> Self {
        self.limit_from = 0;
        self.limit_to = Some(count);
        self
    }

    /// Limits the result to `count` rows starting at `offset`.
    #[must_use]
    pub fn limit_offset(mut self, count: u64, offset: u64) -> Self {
        self.limit_from = offset;
        self.limit_to = Some(count);
        self
    }

    /// Appends `other` as a UNION branch. The outer ORDER BY and LIMIT of
    /// `self` apply to the combined statement, after all branches.
    #[must_use]
    pub fn union(mut self, other: QueryBuilder<'a>) -> Self {
        self.unions.push(other);
        self
    }

    /// Prefixes the statement with `EXPLAIN`.
    #[must_use]
    pub fn explain(mut self) -> Self {
        self.explain = ExplainMode::Plain;
        self
    }

    /// Prefixes the statement with `EXPLAIN EXTENDED`.
    #[must_use]
    pub fn explain_extended(mut self) -> Self {
        self.explain = ExplainMode::Extended;
        self
    }

    /// Adds `SQL_NO_CACHE` to the projection.
    #[must_use]
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    /// Renders the SELECT statement.
    pub fn render(&self) -> Result<String, QueryError> {
        self.render_internal(None, false)
    }

    /// Renders with the projection replaced, for INSERT ... SELECT.
    pub(crate) fn render_with_projection(
        &self,
        projection: &str,
    ) -> Result<String, QueryError> {
        self.render_internal(Some(projection), true)
    }

    /// Renders a DELETE touching the given aliases, derived from this
    /// query's FROM/JOIN/WHERE shape. With no aliases only the base table
    /// is deleted from.
    pub fn render_delete(&self, aliases: &[&str]) -> Result<String, QueryError> {
        let select = self.render_internal(Some("*"), true)?;
        let targets = if aliases.is_empty() {
            format!("`{}`", self.table)
        } else {
            aliases.join(", ")
        };
        Ok(select.replacen("SELECT *", &format!("DELETE {targets}"), 1))
    }

    fn render_internal(
        &self,
        projection_override: Option<&str>,
        plain: bool,
    ) -> Result<String, QueryError> {
        let projection = match projection_override {
            Some(text) => text.to_string(),
            None if self.projection.is_empty() => String::from("*"),
            None => self
                .projection
                .iter()
                .map(|c| c.render(&self.table))
                .collect::<Vec<_>>()
                .join(", "),
        };

        let mut sql = String::new();
        if !plain {
            match self.explain {
                ExplainMode::Off => {}
                ExplainMode::Plain => sql.push_str("EXPLAIN "),
                ExplainMode::Extended => sql.push_str("EXPLAIN EXTENDED "),
            }
        }
        sql.push_str("SELECT ");
        if self.no_cache && !plain {
            sql.push_str("SQL_NO_CACHE ");
        }
        sql.push_str(&projection);
        let _ = write!(sql, "\nFROM `{}`", self.table);

        for join in &self.joins {
            let _ = write!(sql, "\n{}", join.render(self.catalog, &self.table)?);
        }

        if !self.constraints.is_empty() {
            let conditions = self
                .constraints
                .iter()
                .map(|c| c.render(self.catalog))
                .collect::<Result<Vec<_>, _>>()?;
            let _ = write!(sql, "\nWHERE {}", conditions.join("\nAND "));
        }

        if !self.group_by.is_empty() {
            let _ = write!(sql, "\nGROUP BY {}", self.group_by.join(", "));
        }

        for branch in &self.unions {
            let branch_sql = branch.render_internal(projection_override, true)?;
            let _ = write!(sql, "\nUNION\n{branch_sql}");
        }

        if let Some(order) = &self.sort {
            let _ = write!(sql, "\nORDER BY {order}");
        }

        if let Some(to) = self.limit_to {
            if self.limit_from > 0 {
                let _ = write!(sql, "\nLIMIT {}, {to}", self.limit_from);
            } else {
                let _ = write!(sql, "\nLIMIT {to}");
            }
        }

        Ok(sql)
    }
}
