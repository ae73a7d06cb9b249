//! Filter repository: the request-facing entry point per entity.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgRow;
use tracing::info;

use modelfilter_core::compiler::{Compiled, PredicateCompiler};
use modelfilter_core::config::FilterSettings;
use modelfilter_core::result::FilterResult;
use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{FilterConfig, PageRequest, PageResponse, QueryParams, SortField};

use crate::query::SqlQuery;
use crate::schema::PgSchemaIntrospector;

/// Compiles request parameters into queries over entity `E`.
pub struct FilterRepository<E> {
    pool: PgPool,
    schema: Arc<PgSchemaIntrospector>,
    settings: FilterSettings,
    filters: FilterConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E> FilterRepository<E>
where
    E: Filterable + for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
{
    /// Create a repository using the filters declared by `E`.
    pub fn new(pool: PgPool, schema: Arc<PgSchemaIntrospector>, settings: FilterSettings) -> Self {
        Self {
            pool,
            schema,
            settings,
            filters: E::filters(),
            _entity: PhantomData,
        }
    }

    /// Replace the filter declarations, e.g. with configured overrides applied.
    pub fn with_filters(mut self, filters: FilterConfig) -> Self {
        self.filters = filters;
        self
    }

    /// The filter declarations in effect.
    pub fn filters(&self) -> &FilterConfig {
        &self.filters
    }

    /// A fresh, unfiltered query bound to the pool.
    pub fn query(&self) -> SqlQuery<E> {
        SqlQuery::new(self.pool.clone()).case_insensitive(self.settings.case_insensitive)
    }

    /// Apply `params` to a fresh query and optionally execute it.
    pub async fn filter_results(
        &self,
        params: &QueryParams,
        materialize: bool,
    ) -> FilterResult<Compiled<SqlQuery<E>>> {
        info!(
            table = E::table(),
            params = params.len(),
            materialize,
            "Filtering results"
        );

        self.compiler()
            .compile(
                self.query(),
                E::table(),
                &self.filters,
                params,
                materialize,
            )
            .await
    }

    /// Apply `params`, order the query, and fetch one page.
    pub async fn filter_page(
        &self,
        params: &QueryParams,
        page: PageRequest,
        sort: &[SortField],
    ) -> FilterResult<PageResponse<E>>
    where
        E: Serialize,
    {
        let mut query = self
            .compiler()
            .apply(self.query(), E::table(), &self.filters, params)
            .await?;

        for field in sort {
            query = query.order_by(field.clone())?;
        }

        query.fetch_page(page).await
    }

    fn compiler(&self) -> PredicateCompiler<'_, PgSchemaIntrospector> {
        PredicateCompiler::with_settings(self.schema.as_ref(), &self.settings)
    }
}
