//! Join specifications, shared by query and mutation rendering.

use crate::catalog::SchemaCatalog;
use crate::error::QueryError;
use crate::mask::mask;
use crate::value::Value;

/// Supported join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// INNER JOIN.
    Inner,
    /// LEFT JOIN.
    Left,
}

impl JoinKind {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
        }
    }
}

/// The right-hand side of one ON-clause pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinSource {
    /// A column of the join-from table.
    Column(String),
    /// A fixed value the target column must equal.
    Literal(Value),
}

/// One join: alias, target table, column mapping and an optional raw
/// predicate ANDed into the ON clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    alias: String,
    table: String,
    from_table: Option<String>,
    kind: JoinKind,
    mapping: Vec<(String, JoinSource)>,
    raw_predicate: Option<String>,
}

impl JoinSpec {
    /// Creates an INNER JOIN of `table` under `alias`.
    #[must_use]
    pub fn inner(alias: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(alias, table, JoinKind::Inner)
    }

    /// Creates a LEFT JOIN of `table` under `alias`.
    #[must_use]
    pub fn left(alias: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(alias, table, JoinKind::Left)
    }

    fn new(alias: impl Into<String>, table: impl Into<String>, kind: JoinKind) -> Self {
        Self {
            alias: alias.into(),
            table: table.into(),
            from_table: None,
            kind,
            mapping: Vec::new(),
            raw_predicate: None,
        }
    }

    /// Pairs `target_column` of the joined table with `source_column` of
    /// the join-from table.
    #[must_use]
    pub fn on_column(
        mut self,
        target_column: impl Into<String>,
        source_column: impl Into<String>,
    ) -> Self {
        self.mapping.push((
            target_column.into(),
            JoinSource::Column(source_column.into()),
        ));
        self
    }

    /// Pins `target_column` of the joined table to a fixed value. The
    /// value is masked through the column's metadata at render time.
    #[must_use]
    pub fn on_value(
        mut self,
        target_column: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.mapping
            .push((target_column.into(), JoinSource::Literal(value.into())));
        self
    }

    /// Joins from `table` instead of the builder's base table.
    #[must_use]
    pub fn from_table(mut self, table: impl Into<String>) -> Self {
        self.from_table = Some(table.into());
        self
    }

    /// ANDs a raw predicate into the ON clause, verbatim.
    #[must_use]
    pub fn and_raw(mut self, predicate: impl Into<String>) -> Self {
        self.raw_predicate = Some(predicate.into());
        self
    }

    /// The alias this join is cached and referenced under.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The joined (target) table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Renders `KIND JOIN \`table\` AS alias ON (...)`.
    ///
    /// Pinned values are masked through the joined column's metadata, so
    /// the alias must already be cached in `catalog`.
    pub(crate) fn render(
        &self,
        catalog: &SchemaCatalog,
        default_from: &str,
    ) -> Result<String, QueryError> {
        let from = self.from_table.as_deref().unwrap_or(default_from);

        let mut parts = Vec::with_capacity(self.mapping.len() + 1);
        for (target, source) in &self.mapping {
            parts.push(match source {
                JoinSource::Column(src) => {
                    format!("`{from}`.`{src}` = `{}`.`{target}`", self.alias)
                }
                JoinSource::Literal(value) => {
                    let metadata = catalog.column(&self.alias, target)?;
                    format!("`{}`.`{target}` = {}", self.alias, mask(&metadata, value))
                }
            });
        }

        if let Some(predicate) = &self.raw_predicate {
            parts.push(predicate.clone());
        }

        Ok(format!(
            "{} JOIN `{}` AS {} ON ({})",
            self.kind.keyword(),
            self.table,
            self.alias,
            parts.join(" AND ")
        ))
    }
}
