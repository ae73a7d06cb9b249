//! Translation of predicate trees into PostgreSQL.
//!
//! Relation hops become correlated `EXISTS (SELECT 1 ...)` subqueries, one
//! per hop, with the remaining hops and the scoped conditions nested inside
//! the innermost one.

use sqlx::{Postgres, QueryBuilder};

use modelfilter_core::error::FilterError;
use modelfilter_core::predicate::Predicate;
use modelfilter_core::result::FilterResult;
use modelfilter_core::types::{EntityMeta, RelationKind, RelationMeta, RelationPath, Scalar};

/// Incrementally built SQL statement plus a readable copy of its bind values.
pub(crate) struct Renderer {
    builder: QueryBuilder<'static, Postgres>,
    binds: Vec<Scalar>,
    aliases: usize,
    like_operator: &'static str,
}

impl Renderer {
    pub(crate) fn new(like_operator: &'static str) -> Self {
        Self {
            builder: QueryBuilder::new(""),
            binds: Vec::new(),
            aliases: 0,
            like_operator,
        }
    }

    pub(crate) fn push(&mut self, sql: &str) {
        self.builder.push(sql);
    }

    pub(crate) fn bind(&mut self, value: Scalar) {
        match &value {
            Scalar::Bool(b) => self.builder.push_bind(*b),
            Scalar::Int(i) => self.builder.push_bind(*i),
            Scalar::Float(f) => self.builder.push_bind(*f),
            Scalar::Text(s) => self.builder.push_bind(s.clone()),
        };
        self.binds.push(value);
    }

    /// Allocate a fresh table alias.
    pub(crate) fn alias(&mut self) -> String {
        let alias = format!("t{}", self.aliases);
        self.aliases += 1;
        alias
    }

    pub(crate) fn into_parts(self) -> (QueryBuilder<'static, Postgres>, Vec<Scalar>) {
        (self.builder, self.binds)
    }

    /// Render `predicates` joined by `AND`, evaluated against `alias`.
    pub(crate) fn conjunction(
        &mut self,
        alias: &str,
        meta: &'static EntityMeta,
        predicates: &[Predicate],
    ) -> FilterResult<()> {
        for (i, predicate) in predicates.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.predicate(alias, meta, predicate)?;
        }
        Ok(())
    }

    fn predicate(
        &mut self,
        alias: &str,
        meta: &'static EntityMeta,
        predicate: &Predicate,
    ) -> FilterResult<()> {
        match predicate {
            // Values compare as text so a bind never mismatches the column type.
            Predicate::Eq { column, value } => {
                self.column(alias, column, true);
                self.push(" = ");
                self.bind(Scalar::Text(value.to_text()));
            }
            Predicate::IsNull { column } => {
                self.column(alias, column, false);
                self.push(" IS NULL");
            }
            Predicate::In { values, .. } if values.is_empty() => self.push("FALSE"),
            Predicate::In { column, values } => {
                self.column(alias, column, true);
                self.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.bind(Scalar::Text(value.to_text()));
                }
                self.push(")");
            }
            Predicate::Like { column, pattern } => self.like(alias, column, pattern),
            Predicate::AnyLike { patterns, .. } if patterns.is_empty() => self.push("TRUE"),
            Predicate::AnyLike { column, patterns } => {
                self.push("(");
                for (i, pattern) in patterns.iter().enumerate() {
                    if i > 0 {
                        self.push(" OR ");
                    }
                    self.like(alias, column, pattern);
                }
                self.push(")");
            }
            Predicate::Exists {
                relation,
                conditions,
            } => self.exists(alias, meta, relation, conditions)?,
            Predicate::NotExists { relation } => {
                self.push("NOT ");
                self.exists(alias, meta, relation, &[])?;
            }
        }
        Ok(())
    }

    fn like(&mut self, alias: &str, column: &str, pattern: &str) {
        self.column(alias, column, true);
        let operator = format!(" {} ", self.like_operator);
        self.push(&operator);
        self.bind(Scalar::Text(pattern.to_string()));
    }

    fn column(&mut self, alias: &str, column: &str, as_text: bool) {
        let qualified = qualify(alias, column);
        if as_text {
            self.push(&format!("CAST({qualified} AS TEXT)"));
        } else {
            self.push(&qualified);
        }
    }

    fn exists(
        &mut self,
        alias: &str,
        meta: &'static EntityMeta,
        relation: &RelationPath,
        conditions: &[Predicate],
    ) -> FilterResult<()> {
        let hops = meta.resolve_path(relation)?;
        if hops.is_empty() {
            return Err(FilterError::validation(format!(
                "Empty relation path on '{}'",
                meta.table
            )));
        }
        self.hop(alias, &hops, conditions)
    }

    fn hop(
        &mut self,
        parent: &str,
        hops: &[(&'static EntityMeta, &'static RelationMeta)],
        conditions: &[Predicate],
    ) -> FilterResult<()> {
        let Some(((owner, relation), rest)) = hops.split_first() else {
            return Ok(());
        };

        let target = relation.target();
        let alias = self.alias();

        self.push(&format!(
            "EXISTS (SELECT 1 FROM {} AS {}",
            quote_ident(target.table),
            quote_ident(&alias)
        ));

        match relation.kind {
            RelationKind::BelongsTo { foreign_key } => {
                self.push(&format!(
                    " WHERE {} = {}",
                    qualify(&alias, target.primary_key),
                    qualify(parent, foreign_key)
                ));
            }
            RelationKind::HasOne { foreign_key } | RelationKind::HasMany { foreign_key } => {
                self.push(&format!(
                    " WHERE {} = {}",
                    qualify(&alias, foreign_key),
                    qualify(parent, owner.primary_key)
                ));
            }
            RelationKind::BelongsToMany {
                pivot,
                foreign_pivot_key,
                related_pivot_key,
            } => {
                let pivot_alias = self.alias();
                self.push(&format!(
                    " JOIN {} AS {} ON {} = {} WHERE {} = {}",
                    quote_ident(pivot),
                    quote_ident(&pivot_alias),
                    qualify(&pivot_alias, related_pivot_key),
                    qualify(&alias, target.primary_key),
                    qualify(&pivot_alias, foreign_pivot_key),
                    qualify(parent, owner.primary_key)
                ));
            }
        }

        if rest.is_empty() {
            for condition in conditions {
                self.push(" AND ");
                self.predicate(&alias, target, condition)?;
            }
        } else {
            self.push(" AND ");
            self.hop(&alias, rest, conditions)?;
        }

        self.push(")");
        Ok(())
    }
}

/// Quote an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn qualify(alias: &str, column: &str) -> String {
    format!("{}.{}", quote_ident(alias), quote_ident(column))
}
