//! Post entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig, RelationKind, RelationMeta, Strategy};

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    /// Unique post identifier.
    pub id: Uuid,
    /// The author who wrote the post.
    pub author_id: Uuid,
    /// Post title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Publication status: `draft`, `live`, or `archived`.
    pub status: String,
    /// Post body.
    pub body: Option<String>,
    /// When the post went live.
    pub published_at: Option<DateTime<Utc>>,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
}

/// Table metadata for [`Post`].
pub static POST_META: EntityMeta = EntityMeta {
    table: "posts",
    primary_key: "id",
    columns: &[
        "id",
        "author_id",
        "title",
        "slug",
        "status",
        "body",
        "published_at",
        "created_at",
    ],
    relations: &[
        RelationMeta {
            name: "author",
            kind: RelationKind::BelongsTo {
                foreign_key: "author_id",
            },
            target: <crate::Author as Filterable>::meta,
        },
        RelationMeta {
            name: "tags",
            kind: RelationKind::BelongsToMany {
                pivot: "post_tag",
                foreign_pivot_key: "post_id",
                related_pivot_key: "tag_id",
            },
            target: <crate::Tag as Filterable>::meta,
        },
        RelationMeta {
            name: "comments",
            kind: RelationKind::HasMany {
                foreign_key: "post_id",
            },
            target: <crate::Comment as Filterable>::meta,
        },
    ],
};

impl Filterable for Post {
    fn meta() -> &'static EntityMeta {
        &POST_META
    }

    fn filters() -> FilterConfig {
        FilterConfig::new()
            .with("title", Strategy::Partial)
            .with("slug", Strategy::Start)
            .with("status", Strategy::Exact)
            .with("body", Strategy::Partial)
            .with("author", Strategy::Exist)
            .with("author:name", Strategy::Start)
            .with("author:email", Strategy::End)
            .with("author:profile", Strategy::Exist)
            .with("tags", Strategy::Exist)
            .with("tags:name", Strategy::Exact)
            .with("comments", Strategy::Exist)
            .with("comments:body", Strategy::Partial)
            .with("comments:author:name", Strategy::Partial)
    }
}
