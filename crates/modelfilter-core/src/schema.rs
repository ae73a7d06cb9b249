//! Schema introspection backed by static entity metadata.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error::FilterError;
use crate::result::FilterResult;
use crate::traits::schema::SchemaIntrospector;
use crate::types::relation::EntityMeta;

/// A fixed table → columns map.
///
/// Useful when the column list is known at compile time, or to render
/// queries without a database connection.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: HashMap<String, HashSet<String>>,
}

impl StaticSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its columns.
    pub fn with_table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables
            .insert(table.into(), columns.into_iter().map(Into::into).collect());
        self
    }

    /// Build a schema from entity metadata.
    pub fn from_entities<'a, I>(entities: I) -> Self
    where
        I: IntoIterator<Item = &'a EntityMeta>,
    {
        entities.into_iter().fold(Self::new(), |schema, meta| {
            schema.with_table(meta.table, meta.columns.iter().copied())
        })
    }
}

#[async_trait]
impl SchemaIntrospector for StaticSchema {
    async fn has_column(&self, table: &str, column: &str) -> FilterResult<bool> {
        self.tables
            .get(table)
            .map(|columns| columns.contains(column))
            .ok_or_else(|| FilterError::not_found(format!("Table '{table}' does not exist")))
    }
}
