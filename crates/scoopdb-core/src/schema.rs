//! Column metadata types.
//!
//! These types describe what the introspection collaborator reports about a
//! table: per-column type codes, nullability, key flags and lengths. The
//! coarse `TypeCategory` (the fieldset) drives value masking and operator
//! legality.

use serde::{Deserialize, Serialize};

/// Backend column type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    /// Variable-length character string.
    Varchar,
    /// Fixed-length character string.
    Char,
    /// Enumeration.
    Enum,
    /// Set.
    Set,
    /// Tiny binary large object.
    TinyBlob,
    /// Medium binary large object.
    MediumBlob,
    /// Long binary large object.
    LongBlob,
    /// Binary large object / TEXT.
    Blob,
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Fixed-point decimal.
    Decimal,
    /// 8-bit integer.
    TinyInt,
    /// 16-bit integer.
    SmallInt,
    /// 24-bit integer.
    MediumInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Bit field.
    Bit,
    /// JSON document.
    Json,
    /// Spatial data.
    Geometry,
}

/// The coarse type category driving masking and operator legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeCategory {
    /// Quoted and escaped: character, blob and date/time types.
    Text,
    /// Emitted bare, empty values coerce to `0`.
    Numeric,
    /// Everything else; escaped but never quoted or coerced.
    Other,
}

impl ColumnType {
    /// Returns the fieldset this type code belongs to.
    #[must_use]
    pub const fn category(self) -> TypeCategory {
        match self {
            Self::Varchar
            | Self::Char
            | Self::Enum
            | Self::Set
            | Self::TinyBlob
            | Self::MediumBlob
            | Self::LongBlob
            | Self::Blob
            | Self::Date
            | Self::DateTime
            | Self::Time
            | Self::Timestamp => TypeCategory::Text,
            Self::Decimal
            | Self::TinyInt
            | Self::SmallInt
            | Self::MediumInt
            | Self::Int
            | Self::BigInt
            | Self::Float
            | Self::Double => TypeCategory::Numeric,
            Self::Bit | Self::Json | Self::Geometry => TypeCategory::Other,
        }
    }
}

/// Metadata for one table column, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Backend type code.
    pub column_type: ColumnType,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Declared length, if any.
    pub length: Option<u32>,
}

impl ColumnMetadata {
    /// Creates metadata for a NOT NULL, non-key column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            length: None,
        }
    }

    /// Marks the column as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the declared length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Returns the fieldset of this column.
    #[must_use]
    pub const fn category(&self) -> TypeCategory {
        self.column_type.category()
    }
}

/// The ordered column metadata of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// The table this schema was loaded from.
    pub table: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnMetadata>,
}

impl TableSchema {
    /// Creates a schema from a table name and its columns.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<ColumnMetadata>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the primary key columns in declaration order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        assert_eq!(ColumnType::Varchar.category(), TypeCategory::Text);
        assert_eq!(ColumnType::Timestamp.category(), TypeCategory::Text);
        assert_eq!(ColumnType::Blob.category(), TypeCategory::Text);
        assert_eq!(ColumnType::Decimal.category(), TypeCategory::Numeric);
        assert_eq!(ColumnType::Double.category(), TypeCategory::Numeric);
        assert_eq!(ColumnType::Json.category(), TypeCategory::Other);
        assert_eq!(ColumnType::Bit.category(), TypeCategory::Other);
    }

    #[test]
    fn test_column_metadata_builders() {
        let col = ColumnMetadata::new("id", ColumnType::Int)
            .primary_key()
            .auto_increment()
            .length(11);

        assert_eq!(col.name, "id");
        assert!(col.primary_key);
        assert!(col.auto_increment);
        assert!(!col.nullable);
        assert_eq!(col.length, Some(11));
        assert_eq!(col.category(), TypeCategory::Numeric);
    }

    #[test]
    fn test_table_schema_lookup() {
        let schema = TableSchema::new(
            "users",
            vec![
                ColumnMetadata::new("id", ColumnType::Int).primary_key(),
                ColumnMetadata::new("name", ColumnType::Varchar).nullable(),
            ],
        );

        assert!(schema.column("name").is_some());
        assert!(schema.column("missing").is_none());
        let pks: Vec<_> = schema.primary_key_columns().collect();
        assert_eq!(pks.len(), 1);
        assert_eq!(pks[0].name, "id");
    }
}
