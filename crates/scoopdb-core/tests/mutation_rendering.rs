//! Mutation rendering: INSERT key synthesis, upserts, UPDATE no-ops and
//! insert-from-select.

mod common;
use common::*;

use scoopdb_core::{
    insert_from_select, insert_from_select_or_update, Error, MutationBuilder, MutationKind,
    QueryBuilder, SelectColumnPair, Value,
};

#[test]
fn insert_renders_set_syntax() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::new(&catalog, "orders")
        .unwrap()
        .set("status", "open")
        .unwrap()
        .set("total", 19.5)
        .unwrap()
        .render(MutationKind::Insert)
        .unwrap()
        .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `orders`\nSET `orders`.`status` = 'open', `orders`.`total` = 19.5"
    );
}

#[test]
fn insert_synthesizes_non_autoincrement_keys() {
    let catalog = fixture_catalog();
    // tags has a composite, non-auto-increment primary key.
    let sql = MutationBuilder::with_primary_key(
        &catalog,
        "tags",
        vec![("order_id", Value::from(7)), ("label", Value::from("rush"))],
    )
    .unwrap()
    .set("weight", 1.5)
    .unwrap()
    .render(MutationKind::Insert)
    .unwrap()
    .unwrap();
    assert_eq!(
        sql,
        "INSERT INTO `tags`\nSET `tags`.`order_id` = 7, `tags`.`label` = 'rush', `tags`.`weight` = 1.5"
    );
}

#[test]
fn insert_skips_autoincrement_and_explicitly_assigned_keys() {
    let catalog = fixture_catalog();
    // orders.id is auto-increment, so nothing is synthesized for it.
    let auto = MutationBuilder::with_primary_key(&catalog, "orders", vec![("id", Value::from(3))])
        .unwrap()
        .set("status", "open")
        .unwrap()
        .render(MutationKind::Insert)
        .unwrap()
        .unwrap();
    assert!(!auto.contains("`orders`.`id`"));

    // An explicitly assigned key appears once, from the assignment.
    let assigned = MutationBuilder::with_primary_key(
        &catalog,
        "tags",
        vec![("order_id", Value::from(7)), ("label", Value::from("rush"))],
    )
    .unwrap()
    .set_primary_key("order_id", 8)
    .unwrap()
    .render(MutationKind::Insert)
    .unwrap()
    .unwrap();
    assert_eq!(assigned.matches("`tags`.`order_id`").count(), 1);
    assert!(assigned.contains("`tags`.`order_id` = 8"));
}

#[test]
fn insert_ignore_uses_ignore_verb() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::new(&catalog, "orders")
        .unwrap()
        .set("status", "open")
        .unwrap()
        .render(MutationKind::InsertIgnore)
        .unwrap()
        .unwrap();
    assert!(sql.starts_with("INSERT IGNORE INTO `orders`"));
}

#[test]
fn upsert_lists_only_non_key_assignments() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::with_primary_key(
        &catalog,
        "tags",
        vec![("order_id", Value::from(7)), ("label", Value::from("rush"))],
    )
    .unwrap()
    .set("weight", 2.0)
    .unwrap()
    .set_primary_key("label", "bulk")
    .unwrap()
    .render(MutationKind::InsertOrUpdate)
    .unwrap()
    .unwrap();
    assert!(sql.starts_with("INSERT INTO `tags`"));
    assert!(sql.contains("\nON DUPLICATE KEY UPDATE `tags`.`weight` = 2"));
    // Key columns never appear in the conflict-update list.
    let (_, duplicate_clause) = sql.split_once("ON DUPLICATE KEY UPDATE").unwrap();
    assert!(!duplicate_clause.contains("label"));
    assert!(!duplicate_clause.contains("order_id"));
}

#[test]
fn update_renders_key_equality_where() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::with_primary_key(&catalog, "orders", vec![("id", Value::from(42))])
        .unwrap()
        .set("status", "shipped")
        .unwrap()
        .set_now("created")
        .unwrap()
        .render(MutationKind::Update)
        .unwrap()
        .unwrap();
    assert_eq!(
        sql,
        "UPDATE `orders`\nSET `orders`.`status` = 'shipped', `orders`.`created` = NOW()\nWHERE `orders`.`id` = 42"
    );
}

#[test]
fn update_with_composite_key_joins_conditions_with_and() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::with_primary_key(
        &catalog,
        "tags",
        vec![("order_id", Value::from(7)), ("label", Value::from("rush"))],
    )
    .unwrap()
    .set("weight", 3.5)
    .unwrap()
    .render(MutationKind::Update)
    .unwrap()
    .unwrap();
    assert!(sql.ends_with("WHERE `tags`.`order_id` = 7 AND `tags`.`label` = 'rush'"));
}

#[test]
fn update_without_assignments_is_a_no_op() {
    let catalog = fixture_catalog();
    let rendered =
        MutationBuilder::with_primary_key(&catalog, "orders", vec![("id", Value::from(1))])
            .unwrap()
            .render(MutationKind::Update)
            .unwrap();
    assert!(rendered.is_none());
}

#[test]
fn update_without_key_values_is_rejected() {
    let catalog = fixture_catalog();
    let err = MutationBuilder::new(&catalog, "orders")
        .unwrap()
        .set("status", "lost")
        .unwrap()
        .render(MutationKind::Update)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(scoopdb_core::ConfigError::MissingPrimaryKey { ref table }) if table == "orders"
    ));
}

#[test]
fn plain_assignment_to_key_column_is_rejected() {
    let catalog = fixture_catalog();
    let err = MutationBuilder::new(&catalog, "tags")
        .unwrap()
        .set("label", "oops")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(scoopdb_core::ConfigError::PrimaryKeyAssignment { ref column, .. })
            if column == "label"
    ));
}

#[test]
fn null_assignments_follow_column_nullability() {
    let catalog = fixture_catalog();
    let sql = MutationBuilder::with_primary_key(&catalog, "orders", vec![("id", Value::from(1))])
        .unwrap()
        .set("note", Value::Null)
        .unwrap()
        .set("status", Value::Null)
        .unwrap()
        .render(MutationKind::Update)
        .unwrap()
        .unwrap();
    assert!(sql.contains("`orders`.`note` = NULL"));
    assert!(sql.contains("`orders`.`status` = ''"));
}

#[test]
fn insert_from_select_prefixes_target_columns() {
    let catalog = fixture_catalog();
    let query = QueryBuilder::new(&catalog, "orders")
        .unwrap()
        .column("customer_id")
        .column("total")
        .equals("status", "closed");
    let sql = insert_from_select(&query, "orders_archive", &["customer_id", "total"]).unwrap();
    assert!(sql.starts_with("INSERT INTO `orders_archive` (customer_id, total)\nSELECT "));
    assert!(sql.contains("`orders`.`customer_id`, `orders`.`total`"));
}

#[test]
fn insert_from_select_or_update_excludes_insert_only_pairs() {
    let catalog = fixture_catalog();
    let query = QueryBuilder::new(&catalog, "orders")
        .unwrap()
        .equals("status", "closed");
    let sql = insert_from_select_or_update(
        &query,
        "orders_archive",
        &[
            SelectColumnPair::insert_only("`orders`.`id`", "id"),
            SelectColumnPair::new("`orders`.`total`", "total"),
        ],
        true,
    )
    .unwrap();
    assert!(sql.starts_with("INSERT IGNORE INTO `orders_archive` (id, total)\nSELECT `orders`.`id`, `orders`.`total`\nFROM `orders`"));
    assert!(sql.ends_with("\nON DUPLICATE KEY UPDATE\ntotal = `orders`.`total`"));
    assert!(!sql.contains("id = `orders`.`id`"));
}
