//! Alias-keyed column metadata cache.
//!
//! A `SchemaCatalog` is owned by the caller (one per connection/session)
//! and loads each table's metadata at most once per alias through the
//! injected [`Introspector`]. A table joined under several aliases is
//! cached under each alias separately, because constraints always refer to
//! aliases.
//!
//! The catalog uses interior mutability and is single-threaded by design;
//! sharing one instance across threads requires external serialization.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::error::{ExecutionError, QueryError};
use crate::schema::{ColumnMetadata, TableSchema};

/// Supplies column metadata for a table.
pub trait Introspector {
    /// Returns the columns of `table` in declaration order.
    fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnMetadata>, ExecutionError>;
}

/// Caches `TableSchema` per alias for the lifetime of the catalog.
pub struct SchemaCatalog {
    introspector: Option<RefCell<Box<dyn Introspector>>>,
    cache: RefCell<HashMap<String, Rc<TableSchema>>>,
}

impl SchemaCatalog {
    /// Creates a catalog that loads metadata through `introspector`.
    #[must_use]
    pub fn new(introspector: Box<dyn Introspector>) -> Self {
        Self {
            introspector: Some(RefCell::new(introspector)),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a catalog seeded with known schemas and no introspector.
    ///
    /// Useful when the schema is statically known, e.g. for the migration
    /// log table, or in tests.
    #[must_use]
    pub fn preloaded<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = (String, TableSchema)>,
    {
        let cache = schemas
            .into_iter()
            .map(|(alias, schema)| (alias, Rc::new(schema)))
            .collect();
        Self {
            introspector: None,
            cache: RefCell::new(cache),
        }
    }

    /// Seeds or replaces the schema cached under `alias`.
    pub fn insert(&self, alias: impl Into<String>, schema: TableSchema) {
        self.cache
            .borrow_mut()
            .insert(alias.into(), Rc::new(schema));
    }

    /// Returns the schema for `alias`, loading `table` on first access.
    ///
    /// With `alias = None` the table is cached under its own name. Once
    /// populated, an alias is never refreshed; use [`Self::reset`] to
    /// drop the cache.
    pub fn fetch_columns(
        &self,
        table: &str,
        alias: Option<&str>,
    ) -> Result<Rc<TableSchema>, QueryError> {
        let alias = alias.unwrap_or(table);
        if let Some(schema) = self.cache.borrow().get(alias) {
            return Ok(Rc::clone(schema));
        }

        let Some(introspector) = &self.introspector else {
            return Err(QueryError::NoIntrospector {
                table: table.to_string(),
            });
        };

        debug!(table, alias, "loading column metadata");
        let columns = introspector
            .borrow_mut()
            .table_columns(table)
            .map_err(|source| QueryError::Introspection {
                table: table.to_string(),
                source,
            })?;

        let schema = Rc::new(TableSchema::new(table, columns));
        self.cache
            .borrow_mut()
            .insert(alias.to_string(), Rc::clone(&schema));
        Ok(schema)
    }

    /// Returns the cached schema for `alias` without loading anything.
    pub fn schema(&self, alias: &str) -> Result<Rc<TableSchema>, QueryError> {
        self.cache
            .borrow()
            .get(alias)
            .map(Rc::clone)
            .ok_or_else(|| QueryError::UnknownAlias {
                alias: alias.to_string(),
            })
    }

    /// Returns the metadata of one column under a cached alias.
    pub fn column(&self, alias: &str, column: &str) -> Result<ColumnMetadata, QueryError> {
        let schema = self.schema(alias)?;
        schema
            .column(column)
            .cloned()
            .ok_or_else(|| QueryError::UnknownColumn {
                table: alias.to_string(),
                column: column.to_string(),
            })
    }

    /// Returns whether `alias` has cached metadata.
    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.cache.borrow().contains_key(alias)
    }

    /// Drops all cached schemas.
    pub fn reset(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl std::fmt::Debug for SchemaCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let aliases: Vec<String> = self.cache.borrow().keys().cloned().collect();
        f.debug_struct("SchemaCatalog")
            .field("aliases", &aliases)
            .field("has_introspector", &self.introspector.is_some())
            .finish()
    }
}
