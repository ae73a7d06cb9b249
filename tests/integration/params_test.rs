//! Request parameter parsing feeding the compiler.

use serde_json::json;

use modelfilter_core::error::ErrorKind;
use modelfilter_core::types::{FilterValue, QueryParams, Scalar};

use crate::helpers::filter_posts;

#[test]
fn test_query_string_lists_and_nulls() {
    let params =
        QueryParams::from_query_str("?status[]=draft&status[]=live&body=&tags%3Aname=news").unwrap();

    assert_eq!(
        params.get("status"),
        Some(&FilterValue::texts(["draft", "live"]))
    );
    assert_eq!(params.get("body"), Some(&FilterValue::Null));
    assert_eq!(params.get("tags:name"), Some(&FilterValue::text("news")));
}

#[test]
fn test_query_string_rejects_associative_keys() {
    let err = QueryParams::from_query_str("author[name]=jo").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn test_json_params() {
    let params = QueryParams::from_json(json!({
        "comments": false,
        "status": ["draft", "live"],
        "title": null
    }))
    .unwrap();

    assert_eq!(params.get("comments"), Some(&FilterValue::Scalar(Scalar::Bool(false))));
    assert_eq!(params.get("title"), Some(&FilterValue::Null));
    assert_eq!(params.len(), 3);

    assert!(QueryParams::from_json(json!({ "author": { "name": "jo" } })).is_err());
    assert!(QueryParams::from_json(json!(["title"])).is_err());
}

#[tokio::test]
async fn test_json_and_query_string_agree() {
    let from_query = QueryParams::from_query_str("status[]=draft&status[]=live&comments=0").unwrap();
    let from_json = QueryParams::from_json(json!({
        "comments": 0,
        "status": ["draft", "live"]
    }))
    .unwrap();

    let expected = filter_posts(&from_query, false).await.unwrap();
    assert_eq!(expected, [2, 4]);
    assert_eq!(filter_posts(&from_json, false).await.unwrap(), expected);
}
