//! Shared fixtures for integration tests.

use serde_json::{Value, json};

use modelfilter_core::memory::MemoryQuery;
use modelfilter_core::traits::Materialize;
use modelfilter_core::types::QueryParams;
use modelfilter_core::{FilterResult, PredicateCompiler};
use modelfilter_entity::Post;
use modelfilter_entity::registry::static_schema;

/// Posts with their relations embedded, as the memory backend expects.
pub fn posts() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "title": "Cat facts",
            "slug": "cat-facts",
            "status": "live",
            "body": "All about cats",
            "author": {
                "name": "Jo March",
                "email": "jo@example.com",
                "profile": { "website": "https://jo.dev", "bio": "Writer" }
            },
            "tags": [{ "name": "news" }, { "name": "pets" }],
            "comments": [
                { "body": "Lovely", "author": { "name": "Marjorie" } }
            ]
        }),
        json!({
            "id": 2,
            "title": "Dog days",
            "slug": "dog-days",
            "status": "draft",
            "body": null,
            "author": { "name": "Amy", "email": "amy@example.org" },
            "tags": [{ "name": "tech" }],
            "comments": []
        }),
        json!({
            "id": 3,
            "title": "Concatenate strings",
            "slug": "concat",
            "status": "archived",
            "body": "Joining text",
            "author": { "name": "Beth", "email": "beth@example.org" },
            "tags": [],
            "comments": [
                { "body": "hi jo", "author": { "name": "Laurie" } }
            ]
        }),
        json!({
            "id": 4,
            "title": "Bobcat sightings",
            "slug": "bobcat",
            "status": "draft",
            "body": "Spotted one",
            "author": { "name": "Jo March", "email": "jo@example.com" },
            "tags": [{ "name": "news" }],
            "comments": []
        }),
    ]
}

/// Filter the fixture posts and return the matching ids in fixture order.
pub async fn filter_posts(params: &QueryParams, case_insensitive: bool) -> FilterResult<Vec<i64>> {
    let schema = static_schema();
    let query = MemoryQuery::new(posts()).case_insensitive(case_insensitive);
    let rows = PredicateCompiler::new(&schema)
        .apply_for::<Post, _>(query, params)
        .await?
        .fetch_all()
        .await?;
    Ok(ids(&rows))
}

/// Ids of `rows`.
pub fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|row| row["id"].as_i64()).collect()
}
