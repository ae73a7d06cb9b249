//! The predicate compiler.
//!
//! Folds query parameters, in order, into a [`QueryContext`]. Each parameter
//! is dispatched on the strategy its search key is configured with; keys
//! without a strategy leave the query untouched.

use tracing::{debug, trace};

use crate::config::FilterSettings;
use crate::result::FilterResult;
use crate::traits::model::Filterable;
use crate::traits::query::{ConditionSink, Materialize, QueryContext};
use crate::traits::schema::SchemaIntrospector;
use crate::types::key::{RelationPath, SearchKey, Target};
use crate::types::params::QueryParams;
use crate::types::strategy::{FilterConfig, Strategy};
use crate::types::value::FilterValue;

/// Outcome of [`PredicateCompiler::compile`].
pub enum Compiled<Q: Materialize> {
    /// The composed query, not yet executed.
    Deferred(Q),
    /// The executed result set.
    Materialized(Q::Output),
}

impl<Q: Materialize> Compiled<Q> {
    /// The deferred query, if execution was not requested.
    pub fn into_deferred(self) -> Option<Q> {
        match self {
            Self::Deferred(query) => Some(query),
            Self::Materialized(_) => None,
        }
    }

    /// The result set, if execution was requested.
    pub fn into_materialized(self) -> Option<Q::Output> {
        match self {
            Self::Deferred(_) => None,
            Self::Materialized(output) => Some(output),
        }
    }

    /// Whether the query was executed.
    pub fn is_materialized(&self) -> bool {
        matches!(self, Self::Materialized(_))
    }
}

/// Translates query parameters into constraints on a query.
#[derive(Debug)]
pub struct PredicateCompiler<'a, S: ?Sized> {
    schema: &'a S,
    escape_wildcards: bool,
}

impl<'a, S> PredicateCompiler<'a, S>
where
    S: SchemaIntrospector + ?Sized,
{
    /// Create a compiler that consults `schema` for column existence.
    pub fn new(schema: &'a S) -> Self {
        Self {
            schema,
            escape_wildcards: false,
        }
    }

    /// Create a compiler configured from settings.
    pub fn with_settings(schema: &'a S, settings: &FilterSettings) -> Self {
        Self::new(schema).escape_wildcards(settings.escape_wildcards)
    }

    /// Escape wildcard characters in requested values.
    pub fn escape_wildcards(mut self, enabled: bool) -> Self {
        self.escape_wildcards = enabled;
        self
    }

    /// Fold `params` into `query` for the entity stored in `table`.
    pub async fn apply<Q>(
        &self,
        query: Q,
        table: &str,
        config: &FilterConfig,
        params: &QueryParams,
    ) -> FilterResult<Q>
    where
        Q: QueryContext,
    {
        let mut query = query;

        for (key, value) in params.iter() {
            let Some(strategy) = config.strategy(key) else {
                trace!(table, key, "No filter strategy configured, skipping parameter");
                continue;
            };

            debug!(table, key, strategy = %strategy, "Applying filter parameter");

            query = match strategy {
                Strategy::Exact => {
                    let target = self.resolve(table, key).await?;
                    exact(query, target, value)
                }
                Strategy::Partial | Strategy::Start | Strategy::End => {
                    let target = self.resolve(table, key).await?;
                    pattern(query, target, value, |v| self.pattern(strategy, v))
                }
                Strategy::Exist => exist(query, key, value),
            };
        }

        Ok(query)
    }

    /// Fold `params` into `query`, then execute it if `materialize` is set.
    pub async fn compile<Q>(
        &self,
        query: Q,
        table: &str,
        config: &FilterConfig,
        params: &QueryParams,
        materialize: bool,
    ) -> FilterResult<Compiled<Q>>
    where
        Q: Materialize,
    {
        let query = self.apply(query, table, config, params).await?;

        if materialize {
            Ok(Compiled::Materialized(query.fetch_all().await?))
        } else {
            Ok(Compiled::Deferred(query))
        }
    }

    /// [`apply`](Self::apply) with the table and filters declared by `E`.
    pub async fn apply_for<E, Q>(&self, query: Q, params: &QueryParams) -> FilterResult<Q>
    where
        E: Filterable,
        Q: QueryContext,
    {
        self.apply(query, E::table(), &E::filters(), params).await
    }

    /// [`compile`](Self::compile) with the table and filters declared by `E`.
    pub async fn filter_results<E, Q>(
        &self,
        query: Q,
        params: &QueryParams,
        materialize: bool,
    ) -> FilterResult<Compiled<Q>>
    where
        E: Filterable,
        Q: Materialize,
    {
        self.compile(query, E::table(), &E::filters(), params, materialize)
            .await
    }

    async fn resolve(&self, table: &str, key: &str) -> FilterResult<Target> {
        let key = SearchKey::parse(key);
        let column_exists = if key.is_local() {
            self.schema.has_column(table, &key.property).await?
        } else {
            false
        };
        Target::resolve(key, column_exists)
    }

    fn pattern(&self, strategy: Strategy, value: &str) -> String {
        let value = if self.escape_wildcards {
            escape_like(value)
        } else {
            value.to_string()
        };
        strategy.pattern(&value).unwrap_or(value)
    }
}

fn exact<Q: QueryContext>(query: Q, target: Target, value: &FilterValue) -> Q {
    match target {
        Target::Column(column) => exact_condition(query, &column, value),
        Target::Related { relation, property } => {
            query.where_exists(&relation, |scope| exact_condition(scope, &property, value))
        }
    }
}

fn exact_condition<C: ConditionSink>(sink: C, column: &str, value: &FilterValue) -> C {
    match value {
        FilterValue::Null => sink.where_null(column),
        FilterValue::Scalar(scalar) => sink.where_eq(column, scalar.clone()),
        FilterValue::List(items) => sink.where_in(column, items.clone()),
    }
}

fn pattern<Q, F>(query: Q, target: Target, value: &FilterValue, format: F) -> Q
where
    Q: QueryContext,
    F: Fn(&str) -> String,
{
    match target {
        Target::Column(column) => pattern_condition(query, &column, value, &format),
        Target::Related { relation, property } => query.where_exists(&relation, |scope| {
            pattern_condition(scope, &property, value, &format)
        }),
    }
}

fn pattern_condition<C, F>(sink: C, column: &str, value: &FilterValue, format: &F) -> C
where
    C: ConditionSink,
    F: Fn(&str) -> String,
{
    match value {
        FilterValue::Null => sink.where_like(column, format("")),
        FilterValue::Scalar(scalar) => sink.where_like(column, format(&scalar.to_text())),
        FilterValue::List(items) if items.is_empty() => sink,
        FilterValue::List(items) => sink.where_any_like(
            column,
            items.iter().map(|item| format(&item.to_text())).collect(),
        ),
    }
}

fn exist<Q: QueryContext>(query: Q, key: &str, value: &FilterValue) -> Q {
    let relation = RelationPath::from_key(key);
    if relation.is_empty() {
        return query;
    }

    match value.presence() {
        Some(true) => query.where_exists(&relation, |scope| scope),
        Some(false) => query.where_not_exists(&relation),
        None => {
            trace!(key, ?value, "Unrecognised existence flag, skipping parameter");
            query
        }
    }
}

/// Escape `LIKE` metacharacters so a value matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::memory::MemoryQuery;
    use crate::predicate::Filter;
    use crate::schema::StaticSchema;
    use crate::types::value::Scalar;

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_table("posts", ["id", "title", "status", "name"])
            .with_table("comments", ["id", "post_id", "body"])
    }

    fn post_filters() -> FilterConfig {
        FilterConfig::new()
            .with("title", Strategy::Partial)
            .with("status", Strategy::Exact)
            .with("tags:name", Strategy::Exact)
            .with("comments", Strategy::Exist)
            .with("comments:author:name", Strategy::Partial)
            .with("name", Strategy::Start)
            .with("slug", Strategy::End)
    }

    async fn compile(params: QueryParams) -> FilterResult<Filter> {
        let schema = schema();
        PredicateCompiler::new(&schema)
            .apply(Filter::new(), "posts", &post_filters(), &params)
            .await
    }

    #[tokio::test]
    async fn test_full_scenario() {
        let params = QueryParams::new()
            .with("title", "cat")
            .with("status", FilterValue::texts(["draft", "live"]))
            .with("tags:name", FilterValue::texts(["news", "tech"]))
            .with("comments", "0");

        let filter = compile(params).await.unwrap();
        assert_eq!(
            filter.to_string(),
            "title LIKE '%cat%' AND status IN ('draft', 'live') \
             AND EXISTS(tags WHERE name IN ('news', 'tech')) AND NOT EXISTS(comments)"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_keys_are_noops() {
        let with_noise = QueryParams::new()
            .with("page", "2")
            .with("status", "live")
            .with("unknown:relation", FilterValue::texts(["x"]));
        let without = QueryParams::new().with("status", "live");

        assert_eq!(
            compile(with_noise).await.unwrap(),
            compile(without).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_exact_scalar_and_list() {
        let filter = compile(QueryParams::new().with("status", "live")).await.unwrap();
        assert_eq!(filter.to_string(), "status = 'live'");

        let filter = compile(QueryParams::new().with("status", FilterValue::texts(["live"])))
            .await
            .unwrap();
        assert_eq!(filter.to_string(), "status IN ('live')");

        let filter = compile(QueryParams::new().with("status", FilterValue::Null))
            .await
            .unwrap();
        assert_eq!(filter.to_string(), "status IS NULL");
    }

    #[tokio::test]
    async fn test_pattern_strategies() {
        let filter = compile(
            QueryParams::new()
                .with("name", FilterValue::texts(["a", "b"]))
                .with("title", "x"),
        )
        .await
        .unwrap();
        assert_eq!(
            filter.to_string(),
            "(name LIKE 'a%' OR name LIKE 'b%') AND title LIKE '%x%'"
        );

        let filter = compile(QueryParams::new().with("name", FilterValue::List(Vec::new())))
            .await
            .unwrap();
        assert!(filter.is_empty());
    }

    #[tokio::test]
    async fn test_relation_traversal_scopes_predicate() {
        let filter = compile(QueryParams::new().with("comments:author:name", "jo"))
            .await
            .unwrap();
        assert_eq!(
            filter.to_string(),
            "EXISTS(comments.author WHERE name LIKE '%jo%')"
        );
    }

    #[tokio::test]
    async fn test_exist_flags() {
        let cases = [
            (FilterValue::Null, "EXISTS(comments)"),
            (FilterValue::text("true"), "EXISTS(comments)"),
            (FilterValue::from(1), "EXISTS(comments)"),
            (FilterValue::text("1"), "EXISTS(comments)"),
            (FilterValue::from(false), "NOT EXISTS(comments)"),
            (FilterValue::from(0), "NOT EXISTS(comments)"),
            (FilterValue::text("0"), "NOT EXISTS(comments)"),
            (FilterValue::text("maybe"), "TRUE"),
        ];

        for (value, expected) in cases {
            let filter = compile(QueryParams::new().with("comments", value.clone()))
                .await
                .unwrap();
            assert_eq!(filter.to_string(), expected, "exist with {value:?}");
        }
    }

    #[tokio::test]
    async fn test_unknown_local_column_fails() {
        let err = compile(QueryParams::new().with("slug", "x")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_missing_table_propagates() {
        let schema = schema();
        let err = PredicateCompiler::new(&schema)
            .apply(
                Filter::new(),
                "drafts",
                &post_filters(),
                &QueryParams::new().with("title", "x"),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_escape_wildcards() {
        let schema = schema();
        let filter = PredicateCompiler::new(&schema)
            .escape_wildcards(true)
            .apply(
                Filter::new(),
                "posts",
                &post_filters(),
                &QueryParams::new().with("title", "50%_off"),
            )
            .await
            .unwrap();
        assert_eq!(
            filter.predicates(),
            [crate::predicate::Predicate::Like {
                column: "title".to_string(),
                pattern: "%50\\%\\_off%".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_compile_deferred_and_materialized() {
        let schema = schema();
        let compiler = PredicateCompiler::new(&schema);
        let rows = vec![
            serde_json::json!({"id": 1, "status": "live"}),
            serde_json::json!({"id": 2, "status": "draft"}),
        ];
        let params = QueryParams::new().with("status", "live");

        let deferred = compiler
            .compile(MemoryQuery::new(rows.clone()), "posts", &post_filters(), &params, false)
            .await
            .unwrap();
        assert!(!deferred.is_materialized());
        let query = deferred.into_deferred().unwrap();
        assert_eq!(query.filter().to_string(), "status = 'live'");

        let materialized = compiler
            .compile(MemoryQuery::new(rows), "posts", &post_filters(), &params, true)
            .await
            .unwrap();
        let rows = materialized.into_materialized().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a%b_c\\d"), "a\\%b\\_c\\\\d");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_exact_condition_on_scope() {
        let scope = exact_condition(Filter::new(), "name", &FilterValue::from(Scalar::Int(3)));
        assert_eq!(scope.to_string(), "name = 3");
    }
}
