//! Static entity metadata: tables, columns, and relations.

use serde::Serialize;

use super::key::RelationPath;
use crate::error::FilterError;

/// Static description of one table-backed entity.
#[derive(Debug, Serialize)]
pub struct EntityMeta {
    /// Table name.
    pub table: &'static str,
    /// Primary key column.
    pub primary_key: &'static str,
    /// Columns of the table.
    pub columns: &'static [&'static str],
    /// Relations reachable from this entity.
    pub relations: &'static [RelationMeta],
}

impl EntityMeta {
    /// Whether `column` is a column of this table.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    /// Find a relation by name.
    pub fn relation(&self, name: &str) -> Option<&'static RelationMeta> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Resolve every hop of a relation path, outermost first.
    pub fn resolve_path(
        &'static self,
        path: &RelationPath,
    ) -> Result<Vec<(&'static EntityMeta, &'static RelationMeta)>, FilterError> {
        let mut hops = Vec::with_capacity(path.len());
        let mut current: &'static EntityMeta = self;

        for segment in path.segments() {
            let relation = current.relation(segment).ok_or_else(|| {
                FilterError::validation(format!(
                    "Unknown relation '{segment}' on '{}' (path '{path}')",
                    current.table
                ))
            })?;
            hops.push((current, relation));
            current = relation.target();
        }

        Ok(hops)
    }
}

/// A named relation from one entity to another.
#[derive(Debug, Serialize)]
pub struct RelationMeta {
    /// Relation name as used in search keys.
    pub name: &'static str,
    /// How the two tables are linked.
    pub kind: RelationKind,
    /// Metadata of the related entity.
    #[serde(skip)]
    pub target: fn() -> &'static EntityMeta,
}

impl RelationMeta {
    /// Metadata of the related entity.
    pub fn target(&self) -> &'static EntityMeta {
        (self.target)()
    }
}

/// Join shape of a relation, seen from the owning entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RelationKind {
    /// The owning table holds `foreign_key` pointing at the target's primary key.
    BelongsTo {
        /// Column on the owning table.
        foreign_key: &'static str,
    },
    /// The target table holds `foreign_key` pointing at the owner's primary key; at most one row.
    HasOne {
        /// Column on the target table.
        foreign_key: &'static str,
    },
    /// The target table holds `foreign_key` pointing at the owner's primary key.
    HasMany {
        /// Column on the target table.
        foreign_key: &'static str,
    },
    /// Linked through a pivot table.
    BelongsToMany {
        /// Pivot table name.
        pivot: &'static str,
        /// Pivot column pointing at the owner's primary key.
        foreign_pivot_key: &'static str,
        /// Pivot column pointing at the target's primary key.
        related_pivot_key: &'static str,
    },
}

impl RelationKind {
    /// Whether the relation yields at most one related row.
    pub fn is_to_one(&self) -> bool {
        matches!(self, Self::BelongsTo { .. } | Self::HasOne { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static AUTHOR: EntityMeta = EntityMeta {
        table: "authors",
        primary_key: "id",
        columns: &["id", "name"],
        relations: &[],
    };

    static BOOK: EntityMeta = EntityMeta {
        table: "books",
        primary_key: "id",
        columns: &["id", "title", "author_id"],
        relations: &[RelationMeta {
            name: "author",
            kind: RelationKind::BelongsTo {
                foreign_key: "author_id",
            },
            target: author,
        }],
    };

    fn author() -> &'static EntityMeta {
        &AUTHOR
    }

    #[test]
    fn test_resolve_path() {
        let hops = BOOK.resolve_path(&RelationPath::new(["author"])).unwrap();
        assert_eq!(hops.len(), 1);
        assert_eq!(hops[0].0.table, "books");
        assert_eq!(hops[0].1.target().table, "authors");
        assert!(hops[0].1.kind.is_to_one());
    }

    #[test]
    fn test_resolve_unknown_relation() {
        let err = BOOK
            .resolve_path(&RelationPath::new(["author", "agent"]))
            .unwrap_err();
        assert!(err.message.contains("agent"));
    }

    #[test]
    fn test_has_column() {
        assert!(BOOK.has_column("title"));
        assert!(!BOOK.has_column("name"));
    }
}
