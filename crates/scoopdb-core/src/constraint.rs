//! WHERE-clause constraints.
//!
//! A constraint is either a schema-checked comparison against an
//! alias-qualified column, or a caller-supplied raw fragment. Comparisons
//! mask their values through the target column's metadata at render time.

use crate::catalog::SchemaCatalog;
use crate::error::QueryError;
use crate::mask::mask;
use crate::schema::TypeCategory;
use crate::value::Value;

/// Comparison operators usable in a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`.
    Eq,
    /// `!=`.
    NotEq,
    /// `LIKE`, text columns only.
    Like,
    /// `NOT LIKE`, text columns only.
    NotLike,
    /// `IN (...)`, degrades to `=` for a single value.
    In,
    /// `BETWEEN a AND b`, exactly two values.
    Between,
    /// `NOT BETWEEN a AND b`, exactly two values.
    NotBetween,
    /// `IS NULL`.
    IsNull,
    /// `IS NOT NULL`.
    IsNotNull,
    /// NULL or empty string, as one parenthesized disjunction.
    NullOrEmpty,
}

/// One WHERE condition, ANDed with its siblings in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// A comparison against a column of a cached alias.
    Compare {
        /// Alias the column belongs to.
        table: String,
        /// The constrained column.
        column: String,
        /// The operator.
        op: Comparison,
        /// Right-hand side values; arity depends on the operator.
        values: Vec<Value>,
    },
    /// A raw condition, emitted verbatim.
    Custom(String),
}

impl Constraint {
    /// Renders this constraint, resolving column metadata through `catalog`.
    pub fn render(&self, catalog: &SchemaCatalog) -> Result<String, QueryError> {
        let (table, column, op, values) = match self {
            Self::Custom(condition) => return Ok(condition.clone()),
            Self::Compare {
                table,
                column,
                op,
                values,
            } => (table, column, op, values),
        };

        let metadata = catalog.column(table, column)?;
        let target = format!("`{table}`.`{column}`");
        let masked = || -> Vec<String> { values.iter().map(|v| mask(&metadata, v)).collect() };
        let first = || -> Result<&Value, QueryError> {
            values.first().ok_or_else(|| QueryError::EmptyValueList {
                table: table.clone(),
                column: column.clone(),
            })
        };

        match op {
            Comparison::Eq => Ok(format!("{target} = {}", mask(&metadata, first()?))),
            Comparison::NotEq => Ok(format!("{target} != {}", mask(&metadata, first()?))),
            Comparison::Like | Comparison::NotLike => {
                if metadata.category() != TypeCategory::Text {
                    return Err(QueryError::LikeOnNonText {
                        table: table.clone(),
                        column: column.clone(),
                    });
                }
                let keyword = if *op == Comparison::Like {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };
                Ok(format!("{target} {keyword} {}", mask(&metadata, first()?)))
            }
            Comparison::In => match values.len() {
                0 => Err(QueryError::EmptyValueList {
                    table: table.clone(),
                    column: column.clone(),
                }),
                // Single-value IN degrades to plain equality.
                1 => Ok(format!("{target} = {}", mask(&metadata, &values[0]))),
                _ => Ok(format!("{target} IN ({})", masked().join(", "))),
            },
            Comparison::Between | Comparison::NotBetween => {
                if values.len() != 2 {
                    return Err(QueryError::BetweenArity {
                        table: table.clone(),
                        column: column.clone(),
                        got: values.len(),
                    });
                }
                let keyword = if *op == Comparison::Between {
                    "BETWEEN"
                } else {
                    "NOT BETWEEN"
                };
                let bounds = masked();
                Ok(format!("{target} {keyword} {} AND {}", bounds[0], bounds[1]))
            }
            Comparison::IsNull => Ok(format!("{target} IS NULL")),
            Comparison::IsNotNull => Ok(format!("{target} IS NOT NULL")),
            Comparison::NullOrEmpty => {
                Ok(format!("({target} IS NULL OR {target} = '')"))
            }
        }
    }
}
