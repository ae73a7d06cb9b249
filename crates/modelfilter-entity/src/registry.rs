//! Lookup of entity metadata by table name.

use modelfilter_core::schema::StaticSchema;
use modelfilter_core::traits::Filterable;
use modelfilter_core::types::{EntityMeta, FilterConfig};

use crate::{Author, Comment, Post, Profile, Tag};

/// Metadata of every entity in this crate.
pub fn all() -> [&'static EntityMeta; 5] {
    [
        Post::meta(),
        Tag::meta(),
        Comment::meta(),
        Author::meta(),
        Profile::meta(),
    ]
}

/// Find entity metadata by table name.
pub fn find(table: &str) -> Option<&'static EntityMeta> {
    all().into_iter().find(|meta| meta.table == table)
}

/// The built-in filter declarations for a table.
pub fn filters(table: &str) -> Option<FilterConfig> {
    match table {
        "posts" => Some(Post::filters()),
        "tags" => Some(Tag::filters()),
        "comments" => Some(Comment::filters()),
        "authors" => Some(Author::filters()),
        "profiles" => Some(Profile::filters()),
        _ => None,
    }
}

/// A schema introspector answering from the declared columns.
pub fn static_schema() -> StaticSchema {
    StaticSchema::from_entities(all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelfilter_core::types::{SearchKey, Strategy};

    #[test]
    fn test_find() {
        assert_eq!(find("posts").map(|m| m.table), Some("posts"));
        assert!(find("drafts").is_none());
    }

    #[test]
    fn test_every_table_has_filters() {
        for meta in all() {
            assert!(filters(meta.table).is_some(), "filters for {}", meta.table);
        }
    }

    /// Every declared search key must point at a real column or relation chain.
    #[test]
    fn test_filter_keys_resolve() {
        for meta in all() {
            let config = filters(meta.table).unwrap();
            for (key, strategy) in config.iter() {
                if strategy == Strategy::Exist {
                    let path = modelfilter_core::types::RelationPath::from_key(key);
                    assert!(meta.resolve_path(&path).is_ok(), "{}:{key}", meta.table);
                    continue;
                }

                let parsed = SearchKey::parse(key);
                let hops = meta.resolve_path(&parsed.relation).unwrap();
                let owner = hops.last().map_or(meta, |(_, rel)| rel.target());
                assert!(
                    owner.has_column(&parsed.property),
                    "{}:{key} -> {}.{}",
                    meta.table,
                    owner.table,
                    parsed.property
                );
            }
        }
    }

    #[test]
    fn test_relations_are_symmetric_in_tables() {
        let post = find("posts").unwrap();
        let tags = post.relation("tags").unwrap();
        assert_eq!(tags.target().table, "tags");
        assert!(!tags.kind.is_to_one());
        assert!(post.relation("author").unwrap().kind.is_to_one());
    }
}
