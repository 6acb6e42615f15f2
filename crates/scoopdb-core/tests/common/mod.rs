#![allow(dead_code)]

use scoopdb_core::schema::{ColumnMetadata, ColumnType, TableSchema};
use scoopdb_core::SchemaCatalog;

/// A catalog preloaded with the fixture tables used across the rendering
/// tests: `orders`, `customers` and `tags`.
pub fn fixture_catalog() -> SchemaCatalog {
    let catalog = SchemaCatalog::preloaded([
        ("orders".to_string(), orders_schema()),
        ("customers".to_string(), customers_schema()),
        ("tags".to_string(), tags_schema()),
    ]);
    catalog.insert("c", customers_schema());
    catalog.insert("t", tags_schema());
    catalog
}

pub fn orders_schema() -> TableSchema {
    TableSchema::new(
        "orders",
        vec![
            ColumnMetadata::new("id", ColumnType::Int)
                .primary_key()
                .auto_increment(),
            ColumnMetadata::new("customer_id", ColumnType::Int),
            ColumnMetadata::new("status", ColumnType::Varchar),
            ColumnMetadata::new("note", ColumnType::Varchar).nullable(),
            ColumnMetadata::new("total", ColumnType::Decimal),
            ColumnMetadata::new("created", ColumnType::DateTime),
        ],
    )
}

pub fn customers_schema() -> TableSchema {
    TableSchema::new(
        "customers",
        vec![
            ColumnMetadata::new("id", ColumnType::Int)
                .primary_key()
                .auto_increment(),
            ColumnMetadata::new("name", ColumnType::Varchar),
            ColumnMetadata::new("email", ColumnType::Varchar).nullable(),
        ],
    )
}

pub fn tags_schema() -> TableSchema {
    TableSchema::new(
        "tags",
        vec![
            ColumnMetadata::new("order_id", ColumnType::Int).primary_key(),
            ColumnMetadata::new("label", ColumnType::Varchar).primary_key(),
            ColumnMetadata::new("weight", ColumnType::Float),
        ],
    )
}
