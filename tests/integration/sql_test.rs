//! SQL rendered for compiled filters, without a database.

use modelfilter_core::PredicateCompiler;
use modelfilter_core::error::ErrorKind;
use modelfilter_core::types::{QueryParams, Scalar};
use modelfilter_database::SqlQuery;
use modelfilter_entity::registry::static_schema;
use modelfilter_entity::{Comment, Post, Tag};

#[tokio::test]
async fn test_comment_belongs_to_scopes() {
    let schema = static_schema();
    let params = QueryParams::from_query_str("post:status=live&author:name=Jo&body=great").unwrap();
    let query = PredicateCompiler::new(&schema)
        .apply_for::<Comment, _>(SqlQuery::<Comment>::unbound(), &params)
        .await
        .unwrap();

    assert_eq!(
        query.filter().to_string(),
        "EXISTS(post WHERE status = 'live') AND EXISTS(author WHERE name = 'Jo') \
         AND body LIKE '%great%'"
    );

    let rendered = query.render().unwrap();
    assert_eq!(
        rendered.sql,
        "SELECT \"t0\".* FROM \"comments\" AS \"t0\" WHERE \
         EXISTS (SELECT 1 FROM \"posts\" AS \"t1\" WHERE \"t1\".\"id\" = \"t0\".\"post_id\" \
         AND CAST(\"t1\".\"status\" AS TEXT) = $1) \
         AND EXISTS (SELECT 1 FROM \"authors\" AS \"t2\" WHERE \"t2\".\"id\" = \"t0\".\"author_id\" \
         AND CAST(\"t2\".\"name\" AS TEXT) = $2) \
         AND CAST(\"t0\".\"body\" AS TEXT) LIKE $3"
    );
    assert_eq!(
        rendered.binds,
        [Scalar::from("live"), Scalar::from("Jo"), Scalar::from("%great%")]
    );
}

#[tokio::test]
async fn test_tag_reverse_many_to_many() {
    let schema = static_schema();
    let params = QueryParams::from_query_str("posts:status=live&slug=ne").unwrap();
    let rendered = PredicateCompiler::new(&schema)
        .apply_for::<Tag, _>(SqlQuery::<Tag>::unbound(), &params)
        .await
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(
        rendered.sql,
        "SELECT \"t0\".* FROM \"tags\" AS \"t0\" WHERE \
         EXISTS (SELECT 1 FROM \"posts\" AS \"t1\" \
         JOIN \"post_tag\" AS \"t2\" ON \"t2\".\"post_id\" = \"t1\".\"id\" \
         WHERE \"t2\".\"tag_id\" = \"t0\".\"id\" \
         AND CAST(\"t1\".\"status\" AS TEXT) = $1) \
         AND CAST(\"t0\".\"slug\" AS TEXT) LIKE $2"
    );
    assert_eq!(rendered.binds, [Scalar::from("live"), Scalar::from("ne%")]);
}

#[tokio::test]
async fn test_empty_params_render_plain_select() {
    let schema = static_schema();
    let rendered = PredicateCompiler::new(&schema)
        .apply_for::<Post, _>(SqlQuery::<Post>::unbound(), &QueryParams::new())
        .await
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered.sql, "SELECT \"t0\".* FROM \"posts\" AS \"t0\"");
    assert!(rendered.binds.is_empty());
}

#[tokio::test]
async fn test_escaped_wildcards_reach_the_binds() {
    let schema = static_schema();
    let params = QueryParams::new().with("title", "100%_done");
    let rendered = PredicateCompiler::new(&schema)
        .escape_wildcards(true)
        .apply_for::<Post, _>(SqlQuery::<Post>::unbound(), &params)
        .await
        .unwrap()
        .render()
        .unwrap();

    assert_eq!(rendered.binds, [Scalar::from("%100\\%\\_done%")]);
}

#[tokio::test]
async fn test_unknown_local_column_never_renders() {
    let schema = static_schema();
    let err = PredicateCompiler::new(&schema)
        .apply(
            SqlQuery::<Post>::unbound(),
            "posts",
            &modelfilter_core::types::FilterConfig::new()
                .with("rating", modelfilter_core::types::Strategy::Exact),
            &QueryParams::new().with("rating", "5"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
