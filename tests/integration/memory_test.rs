//! Filtering fixture rows through the memory backend.

use modelfilter_core::error::ErrorKind;
use modelfilter_core::memory::MemoryQuery;
use modelfilter_core::traits::Materialize;
use modelfilter_core::types::{FilterConfig, FilterValue, QueryParams, Strategy};
use modelfilter_core::{Compiled, PredicateCompiler};
use modelfilter_entity::Post;
use modelfilter_entity::registry::static_schema;

use crate::helpers::{filter_posts, ids, posts};

#[tokio::test]
async fn test_scenario_from_query_string() {
    let params = QueryParams::from_query_str(
        "title=cat&status[]=draft&status[]=live&tags:name[]=news&tags:name[]=tech&comments=0",
    )
    .unwrap();

    assert_eq!(filter_posts(&params, false).await.unwrap(), [4]);
    // "Cat facts" now matches the title but still has a comment.
    assert_eq!(filter_posts(&params, true).await.unwrap(), [4]);
}

#[tokio::test]
async fn test_no_params_returns_everything() {
    let all = filter_posts(&QueryParams::new(), false).await.unwrap();
    assert_eq!(all, [1, 2, 3, 4]);

    let ignored = QueryParams::new()
        .with("unknown", "1")
        .with("published_at", "2024-01-01");
    assert_eq!(filter_posts(&ignored, false).await.unwrap(), all);
}

#[tokio::test]
async fn test_singleton_list_equals_scalar() {
    for (key, value) in [("status", "draft"), ("title", "cat"), ("tags:name", "news")] {
        let scalar = QueryParams::new().with(key, value);
        let list = QueryParams::new().with(key, FilterValue::texts([value]));
        assert_eq!(
            filter_posts(&scalar, false).await.unwrap(),
            filter_posts(&list, false).await.unwrap(),
            "{key}"
        );
    }
}

#[tokio::test]
async fn test_list_is_union_of_values() {
    let values = ["Dog", "Bob", "Cat"];
    let combined = QueryParams::new().with("title", FilterValue::texts(values));
    let combined = filter_posts(&combined, false).await.unwrap();

    let mut union = Vec::new();
    for value in values {
        let single = QueryParams::new().with("title", value);
        union.extend(filter_posts(&single, false).await.unwrap());
    }
    union.sort_unstable();
    union.dedup();

    assert_eq!(combined, union);
    assert_eq!(combined, [1, 2, 4]);
}

#[tokio::test]
async fn test_parameter_order_does_not_matter() {
    let forward = QueryParams::new()
        .with("status", FilterValue::texts(["draft", "live"]))
        .with("author:name", "Jo")
        .with("tags", "1");
    let backward = QueryParams::new()
        .with("tags", "1")
        .with("author:name", "Jo")
        .with("status", FilterValue::texts(["draft", "live"]));

    let expected = filter_posts(&forward, false).await.unwrap();
    assert_eq!(expected, [1, 4]);
    assert_eq!(filter_posts(&backward, false).await.unwrap(), expected);
}

#[tokio::test]
async fn test_nested_relation_scope() {
    // Only the commenter's name is searched, not the comment body.
    let params = QueryParams::new().with("comments:author:name", "jo");
    assert_eq!(filter_posts(&params, false).await.unwrap(), [1]);

    let params = QueryParams::new().with("comments:body", "jo");
    assert_eq!(filter_posts(&params, false).await.unwrap(), [3]);
}

#[tokio::test]
async fn test_start_and_end_strategies() {
    let params = QueryParams::new().with("slug", "c");
    assert_eq!(filter_posts(&params, false).await.unwrap(), [1, 3]);

    let params = QueryParams::new().with("author:email", ".org");
    assert_eq!(filter_posts(&params, false).await.unwrap(), [2, 3]);
}

#[tokio::test]
async fn test_exist_strategy() {
    let cases: [(&str, FilterValue, &[i64]); 6] = [
        ("author:profile", FilterValue::Null, &[1]),
        ("author:profile", "0".into(), &[2, 3, 4]),
        ("comments", true.into(), &[1, 3]),
        ("comments", "false".into(), &[2, 4]),
        ("tags", 1_i64.into(), &[1, 2, 4]),
        ("tags", "maybe".into(), &[1, 2, 3, 4]),
    ];

    for (key, value, expected) in cases {
        let params = QueryParams::new().with(key, value.clone());
        assert_eq!(
            filter_posts(&params, false).await.unwrap(),
            expected,
            "{key}={value:?}"
        );
    }
}

#[tokio::test]
async fn test_partial_null_matches_any_present_value() {
    let params = QueryParams::new().with("body", FilterValue::Null);
    assert_eq!(filter_posts(&params, false).await.unwrap(), [1, 3, 4]);
}

#[tokio::test]
async fn test_custom_config_exact_null_and_empty_list() {
    let schema = static_schema();
    let compiler = PredicateCompiler::new(&schema);
    let config = FilterConfig::new().with("body", Strategy::Exact);

    let params = QueryParams::new().with("body", FilterValue::Null);
    let rows = compiler
        .apply(MemoryQuery::new(posts()), "posts", &config, &params)
        .await
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(ids(&rows), [2]);

    let params = QueryParams::new().with("body", FilterValue::List(Vec::new()));
    let rows = compiler
        .apply(MemoryQuery::new(posts()), "posts", &config, &params)
        .await
        .unwrap()
        .fetch_all()
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_unknown_local_column_is_rejected() {
    let schema = static_schema();
    let config = FilterConfig::new().with("rating", Strategy::Exact);
    let params = QueryParams::new().with("rating", "5");

    let err = PredicateCompiler::new(&schema)
        .apply(MemoryQuery::new(posts()), "posts", &config, &params)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_filter_results_materializes_on_request() {
    let schema = static_schema();
    let compiler = PredicateCompiler::new(&schema);
    let params = QueryParams::new().with("status", "draft");

    let deferred = compiler
        .filter_results::<Post, _>(MemoryQuery::new(posts()), &params, false)
        .await
        .unwrap();
    let Compiled::Deferred(query) = deferred else {
        panic!("expected a deferred query");
    };
    assert_eq!(query.filter().to_string(), "status = 'draft'");

    let materialized = compiler
        .filter_results::<Post, _>(MemoryQuery::new(posts()), &params, true)
        .await
        .unwrap();
    assert!(materialized.is_materialized());
    assert_eq!(ids(&materialized.into_materialized().unwrap()), [2, 4]);
}
