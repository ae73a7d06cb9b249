//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig, RelationKind, RelationMeta, Strategy};

/// A reader comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Unique comment identifier.
    pub id: Uuid,
    /// The post being commented on.
    pub post_id: Uuid,
    /// The commenting author.
    pub author_id: Uuid,
    /// Comment text.
    pub body: String,
    /// When the comment was written.
    pub created_at: DateTime<Utc>,
}

/// Table metadata for [`Comment`].
pub static COMMENT_META: EntityMeta = EntityMeta {
    table: "comments",
    primary_key: "id",
    columns: &["id", "post_id", "author_id", "body", "created_at"],
    relations: &[
        RelationMeta {
            name: "post",
            kind: RelationKind::BelongsTo {
                foreign_key: "post_id",
            },
            target: <crate::Post as Filterable>::meta,
        },
        RelationMeta {
            name: "author",
            kind: RelationKind::BelongsTo {
                foreign_key: "author_id",
            },
            target: <crate::Author as Filterable>::meta,
        },
    ],
};

impl Filterable for Comment {
    fn meta() -> &'static EntityMeta {
        &COMMENT_META
    }

    fn filters() -> FilterConfig {
        FilterConfig::new()
            .with("body", Strategy::Partial)
            .with("author:name", Strategy::Exact)
            .with("post:status", Strategy::Exact)
            .with("post:title", Strategy::Partial)
    }
}
