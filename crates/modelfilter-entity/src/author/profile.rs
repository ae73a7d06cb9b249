//! Author profile entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig, RelationKind, RelationMeta, Strategy};

/// Optional public profile of an author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Unique profile identifier.
    pub id: Uuid,
    /// The author this profile belongs to.
    pub author_id: Uuid,
    /// Short biography.
    pub bio: Option<String>,
    /// Personal website.
    pub website: Option<String>,
}

/// Table metadata for [`Profile`].
pub static PROFILE_META: EntityMeta = EntityMeta {
    table: "profiles",
    primary_key: "id",
    columns: &["id", "author_id", "bio", "website"],
    relations: &[RelationMeta {
        name: "author",
        kind: RelationKind::BelongsTo {
            foreign_key: "author_id",
        },
        target: <crate::Author as Filterable>::meta,
    }],
};

impl Filterable for Profile {
    fn meta() -> &'static EntityMeta {
        &PROFILE_META
    }

    fn filters() -> FilterConfig {
        FilterConfig::new()
            .with("bio", Strategy::Partial)
            .with("website", Strategy::Start)
            .with("author:name", Strategy::Partial)
    }
}
