//! Author entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig, RelationKind, RelationMeta, Strategy};

/// A person who writes posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Author {
    /// Unique author identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// When the author signed up.
    pub created_at: DateTime<Utc>,
}

/// Table metadata for [`Author`].
pub static AUTHOR_META: EntityMeta = EntityMeta {
    table: "authors",
    primary_key: "id",
    columns: &["id", "name", "email", "created_at"],
    relations: &[
        RelationMeta {
            name: "posts",
            kind: RelationKind::HasMany {
                foreign_key: "author_id",
            },
            target: <crate::Post as Filterable>::meta,
        },
        RelationMeta {
            name: "comments",
            kind: RelationKind::HasMany {
                foreign_key: "author_id",
            },
            target: <crate::Comment as Filterable>::meta,
        },
        RelationMeta {
            name: "profile",
            kind: RelationKind::HasOne {
                foreign_key: "author_id",
            },
            target: <crate::Profile as Filterable>::meta,
        },
    ],
};

impl Filterable for Author {
    fn meta() -> &'static EntityMeta {
        &AUTHOR_META
    }

    fn filters() -> FilterConfig {
        FilterConfig::new()
            .with("name", Strategy::Partial)
            .with("email", Strategy::Exact)
            .with("posts", Strategy::Exist)
            .with("posts:title", Strategy::Partial)
            .with("profile", Strategy::Exist)
            .with("profile:website", Strategy::Start)
    }
}
