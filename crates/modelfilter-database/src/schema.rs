//! Column introspection against `information_schema`, cached per table.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use sqlx::PgPool;
use tracing::debug;

use modelfilter_core::config::FilterSettings;
use modelfilter_core::error::{ErrorKind, FilterError};
use modelfilter_core::result::FilterResult;
use modelfilter_core::traits::SchemaIntrospector;

/// Schema introspector reading column lists from PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgSchemaIntrospector {
    pool: PgPool,
    schema: String,
    cache: Cache<String, Arc<HashSet<String>>>,
}

impl PgSchemaIntrospector {
    /// Create an introspector for the `public` schema.
    pub fn new(pool: PgPool, settings: &FilterSettings) -> Self {
        let cache = Cache::builder()
            .max_capacity(settings.schema_cache_capacity)
            .time_to_live(Duration::from_secs(settings.schema_cache_ttl_seconds))
            .build();

        Self {
            pool,
            schema: "public".to_string(),
            cache,
        }
    }

    /// Introspect a schema other than `public`.
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Column names of `table`. A table without columns is reported as missing.
    pub async fn columns(&self, table: &str) -> FilterResult<Arc<HashSet<String>>> {
        if let Some(columns) = self.cache.get(table).await {
            return Ok(columns);
        }

        debug!(schema = %self.schema, table, "Loading column list");

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2",
        )
        .bind(&self.schema)
        .bind(table)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            FilterError::with_source(
                ErrorKind::Database,
                format!("Failed to load columns of '{table}'"),
                e,
            )
        })?;

        if names.is_empty() {
            return Err(FilterError::not_found(format!(
                "Table '{}.{table}' does not exist",
                self.schema
            )));
        }

        let columns = Arc::new(names.into_iter().collect::<HashSet<_>>());
        self.cache.insert(table.to_string(), columns.clone()).await;
        Ok(columns)
    }

    /// Drop the cached column list of `table`, e.g. after a migration.
    pub async fn invalidate(&self, table: &str) {
        self.cache.invalidate(table).await;
    }
}

#[async_trait]
impl SchemaIntrospector for PgSchemaIntrospector {
    async fn has_column(&self, table: &str, column: &str) -> FilterResult<bool> {
        Ok(self.columns(table).await?.contains(column))
    }
}
