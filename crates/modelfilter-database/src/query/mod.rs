//! Deferred PostgreSQL query over one entity.

mod render;

use std::fmt;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;

use modelfilter_core::error::{ErrorKind, FilterError};
use modelfilter_core::predicate::Filter;
use modelfilter_core::result::FilterResult;
use modelfilter_core::traits::{ConditionSink, Filterable, Materialize, QueryContext};
use modelfilter_core::types::{
    EntityMeta, PageRequest, PageResponse, RelationPath, Scalar, SortField,
};

use self::render::{Renderer, qualify, quote_ident};

/// A rendered statement and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rendered {
    /// SQL text with `$n` placeholders.
    pub sql: String,
    /// Bound values, in placeholder order.
    pub binds: Vec<Scalar>,
}

/// A composable query over entity `E`, executed against PostgreSQL.
///
/// Constraints are collected as a [`Filter`] and rendered when the query
/// runs, so a deferred query can still be ordered and paginated.
pub struct SqlQuery<E> {
    meta: &'static EntityMeta,
    filter: Filter,
    sort: Vec<SortField>,
    page: Option<PageRequest>,
    case_insensitive: bool,
    pool: Option<PgPool>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Filterable> SqlQuery<E> {
    /// Create a query bound to a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Some(pool),
            ..Self::unbound()
        }
    }

    /// Create a query that can be rendered but not executed.
    pub fn unbound() -> Self {
        Self {
            meta: E::meta(),
            filter: Filter::new(),
            sort: Vec::new(),
            page: None,
            case_insensitive: false,
            pool: None,
            _entity: PhantomData,
        }
    }
}

impl<E> SqlQuery<E> {
    /// Use `ILIKE` instead of `LIKE` for pattern predicates.
    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Append an `ORDER BY` term. The column must belong to the entity.
    pub fn order_by(mut self, sort: SortField) -> FilterResult<Self> {
        if !self.meta.has_column(&sort.field) {
            return Err(FilterError::validation(format!(
                "Cannot sort '{}' by unknown column '{}'",
                self.meta.table, sort.field
            )));
        }
        self.sort.push(sort);
        Ok(self)
    }

    /// Limit the query to one page.
    pub fn paginate(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// The constraints collected so far.
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Render the `SELECT` statement.
    pub fn render(&self) -> FilterResult<Rendered> {
        let (builder, binds) = self.renderer(false)?.into_parts();
        Ok(Rendered {
            sql: builder.sql().to_string(),
            binds,
        })
    }

    /// Render the statement counting all matching rows, ignoring pagination.
    pub fn render_count(&self) -> FilterResult<Rendered> {
        let (builder, binds) = self.renderer(true)?.into_parts();
        Ok(Rendered {
            sql: builder.sql().to_string(),
            binds,
        })
    }

    fn builder(&self, count: bool) -> FilterResult<QueryBuilder<'static, Postgres>> {
        let (builder, binds) = self.renderer(count)?.into_parts();
        debug!(sql = builder.sql(), binds = binds.len(), "Rendered filter query");
        Ok(builder)
    }

    fn renderer(&self, count: bool) -> FilterResult<Renderer> {
        let like_operator = if self.case_insensitive { "ILIKE" } else { "LIKE" };
        let mut renderer = Renderer::new(like_operator);
        let root = renderer.alias();
        let table = quote_ident(self.meta.table);
        let root_ident = quote_ident(&root);

        if count {
            renderer.push(&format!("SELECT COUNT(*) FROM {table} AS {root_ident}"));
        } else {
            renderer.push(&format!("SELECT {root_ident}.* FROM {table} AS {root_ident}"));
        }

        if !self.filter.is_empty() {
            renderer.push(" WHERE ");
            renderer.conjunction(&root, self.meta, self.filter.predicates())?;
        }

        if count {
            return Ok(renderer);
        }

        for (i, sort) in self.sort.iter().enumerate() {
            renderer.push(if i == 0 { " ORDER BY " } else { ", " });
            renderer.push(&format!(
                "{} {}",
                qualify(&root, &sort.field),
                sort.direction.as_sql()
            ));
        }

        if let Some(page) = &self.page {
            renderer.push(" LIMIT ");
            renderer.bind(Scalar::Int(clamp_i64(page.limit())));
            renderer.push(" OFFSET ");
            renderer.bind(Scalar::Int(clamp_i64(page.offset())));
        }

        Ok(renderer)
    }

    fn pool(&self) -> FilterResult<&PgPool> {
        self.pool.as_ref().ok_or_else(|| {
            FilterError::internal(format!(
                "Query on '{}' is not bound to a connection pool",
                self.meta.table
            ))
        })
    }

    fn map_filter(mut self, f: impl FnOnce(Filter) -> Filter) -> Self {
        self.filter = f(self.filter);
        self
    }
}

impl<E> SqlQuery<E>
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    /// Count all rows matching the constraints.
    pub async fn count(&self) -> FilterResult<u64> {
        let pool = self.pool()?;
        let mut builder = self.builder(true)?;
        let total: i64 = builder
            .build_query_scalar()
            .fetch_one(pool)
            .await
            .map_err(|e| {
                FilterError::with_source(ErrorKind::Database, "Failed to count filtered rows", e)
            })?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// Fetch one page of matching rows together with the total count.
    pub async fn fetch_page(self, page: PageRequest) -> FilterResult<PageResponse<E>>
    where
        E: Serialize,
    {
        let total = self.count().await?;
        let items = self.paginate(page.clone()).fetch_all().await?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }
}

impl<E> fmt::Debug for SqlQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlQuery")
            .field("table", &self.meta.table)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("case_insensitive", &self.case_insensitive)
            .field("bound", &self.pool.is_some())
            .finish()
    }
}

impl<E> ConditionSink for SqlQuery<E> {
    fn where_eq(self, column: &str, value: Scalar) -> Self {
        self.map_filter(|f| f.where_eq(column, value))
    }

    fn where_null(self, column: &str) -> Self {
        self.map_filter(|f| f.where_null(column))
    }

    fn where_in(self, column: &str, values: Vec<Scalar>) -> Self {
        self.map_filter(|f| f.where_in(column, values))
    }

    fn where_like(self, column: &str, pattern: String) -> Self {
        self.map_filter(|f| f.where_like(column, pattern))
    }

    fn where_any_like(self, column: &str, patterns: Vec<String>) -> Self {
        self.map_filter(|f| f.where_any_like(column, patterns))
    }
}

impl<E> QueryContext for SqlQuery<E> {
    type Scope = Filter;

    fn where_exists<F>(self, relation: &RelationPath, scope: F) -> Self
    where
        F: FnOnce(Self::Scope) -> Self::Scope,
    {
        self.map_filter(|f| f.where_exists(relation, scope))
    }

    fn where_not_exists(self, relation: &RelationPath) -> Self {
        self.map_filter(|f| f.where_not_exists(relation))
    }
}

#[async_trait]
impl<E> Materialize for SqlQuery<E>
where
    E: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    type Output = Vec<E>;

    async fn fetch_all(self) -> FilterResult<Self::Output> {
        let pool = self.pool()?;
        let mut builder = self.builder(false)?;
        builder
            .build_query_as::<E>()
            .fetch_all(pool)
            .await
            .map_err(|e| {
                FilterError::with_source(ErrorKind::Database, "Failed to fetch filtered rows", e)
            })
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
