//! Tag entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig, RelationKind, RelationMeta, Strategy};

/// A label attached to posts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tag {
    /// Unique tag identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
}

/// Table metadata for [`Tag`].
pub static TAG_META: EntityMeta = EntityMeta {
    table: "tags",
    primary_key: "id",
    columns: &["id", "name", "slug"],
    relations: &[RelationMeta {
        name: "posts",
        kind: RelationKind::BelongsToMany {
            pivot: "post_tag",
            foreign_pivot_key: "tag_id",
            related_pivot_key: "post_id",
        },
        target: <crate::Post as Filterable>::meta,
    }],
};

impl Filterable for Tag {
    fn meta() -> &'static EntityMeta {
        &TAG_META
    }

    fn filters() -> FilterConfig {
        FilterConfig::new()
            .with("name", Strategy::Exact)
            .with("slug", Strategy::Start)
            .with("posts", Strategy::Exist)
            .with("posts:status", Strategy::Exact)
    }
}
