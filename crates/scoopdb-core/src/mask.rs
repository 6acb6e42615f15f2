//! Type-driven value masking.
//!
//! Converts a raw [`Value`] into backend-safe SQL text using the target
//! column's metadata. The rule order is load-bearing: reordering changes
//! the observable NULL/empty/numeric edge-case behavior.

use crate::schema::{ColumnMetadata, ColumnType, TypeCategory};
use crate::value::{escape, Value};

/// Masks `value` for assignment or comparison against `column`.
///
/// Precedence:
/// 1. NULL on a nullable column emits the NULL literal.
/// 2. Raw expressions pass through verbatim, unescaped.
/// 3. Text-category columns get a quoted, escaped string.
/// 4. Numeric-category columns with an empty value emit `0`.
/// 5. Everything else is escaped unquoted; float and double columns
///    additionally have a decimal comma normalized to a dot first.
#[must_use]
pub fn mask(column: &ColumnMetadata, value: &Value) -> String {
    match value {
        Value::Null if column.nullable => String::from("NULL"),
        Value::Raw(expression) => expression.clone(),
        Value::Null | Value::Literal(_) => {
            let raw = match value {
                Value::Literal(s) => s.as_str(),
                // NULL on a NOT NULL column degrades to the empty value.
                _ => "",
            };
            match column.category() {
                TypeCategory::Text => format!("'{}'", escape(raw)),
                TypeCategory::Numeric if raw.is_empty() => String::from("0"),
                TypeCategory::Numeric | TypeCategory::Other => match column.column_type {
                    ColumnType::Float | ColumnType::Double => escape(&raw.replace(',', ".")),
                    _ => escape(raw),
                },
            }
        }
    }
}
