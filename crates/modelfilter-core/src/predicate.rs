//! Backend-neutral predicate tree.
//!
//! [`Filter`] records constraints in the order they are added. Backends keep
//! one internally and translate it when the query runs, which keeps the
//! compiled shape inspectable without a database.

use std::fmt;

use serde::Serialize;

use crate::traits::query::{ConditionSink, QueryContext};
use crate::types::key::RelationPath;
use crate::types::value::Scalar;

/// One constraint node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "op")]
pub enum Predicate {
    /// `column = value`.
    Eq {
        /// Column name.
        column: String,
        /// Compared value.
        value: Scalar,
    },
    /// `column IS NULL`.
    IsNull {
        /// Column name.
        column: String,
    },
    /// `column IN (values)`.
    In {
        /// Column name.
        column: String,
        /// Accepted values.
        values: Vec<Scalar>,
    },
    /// `column LIKE pattern`.
    Like {
        /// Column name.
        column: String,
        /// Wildcard pattern.
        pattern: String,
    },
    /// Grouped disjunction of `column LIKE pattern`.
    AnyLike {
        /// Column name.
        column: String,
        /// Alternative patterns.
        patterns: Vec<String>,
    },
    /// At least one related row satisfies every nested condition.
    Exists {
        /// Relation path from the enclosing entity.
        relation: RelationPath,
        /// Conditions on the innermost related entity.
        conditions: Vec<Predicate>,
    },
    /// No related row exists.
    NotExists {
        /// Relation path from the enclosing entity.
        relation: RelationPath,
    },
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { column, value } => write!(f, "{column} = {value}"),
            Self::IsNull { column } => write!(f, "{column} IS NULL"),
            Self::In { column, values } => {
                write!(f, "{column} IN (")?;
                write_joined(f, values, ", ")?;
                write!(f, ")")
            }
            Self::Like { column, pattern } => {
                write!(f, "{column} LIKE {}", Scalar::Text(pattern.clone()))
            }
            Self::AnyLike { column, patterns } => {
                write!(f, "(")?;
                for (i, pattern) in patterns.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "{column} LIKE {}", Scalar::Text(pattern.clone()))?;
                }
                write!(f, ")")
            }
            Self::Exists {
                relation,
                conditions,
            } => {
                if conditions.is_empty() {
                    write!(f, "EXISTS({relation})")
                } else {
                    write!(f, "EXISTS({relation} WHERE ")?;
                    write_joined(f, conditions, " AND ")?;
                    write!(f, ")")
                }
            }
            Self::NotExists { relation } => write!(f, "NOT EXISTS({relation})"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{sep}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// An ordered conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// Create an empty filter, matching everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The predicates in the order they were added.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Consume the filter, returning its predicates.
    pub fn into_predicates(self) -> Vec<Predicate> {
        self.predicates
    }

    /// Whether no constraint has been added.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append a predicate.
    pub fn push(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return write!(f, "TRUE");
        }
        write_joined(f, &self.predicates, " AND ")
    }
}

impl ConditionSink for Filter {
    fn where_eq(self, column: &str, value: Scalar) -> Self {
        self.push(Predicate::Eq {
            column: column.to_string(),
            value,
        })
    }

    fn where_null(self, column: &str) -> Self {
        self.push(Predicate::IsNull {
            column: column.to_string(),
        })
    }

    fn where_in(self, column: &str, values: Vec<Scalar>) -> Self {
        self.push(Predicate::In {
            column: column.to_string(),
            values,
        })
    }

    fn where_like(self, column: &str, pattern: String) -> Self {
        self.push(Predicate::Like {
            column: column.to_string(),
            pattern,
        })
    }

    fn where_any_like(self, column: &str, patterns: Vec<String>) -> Self {
        self.push(Predicate::AnyLike {
            column: column.to_string(),
            patterns,
        })
    }
}

impl QueryContext for Filter {
    type Scope = Filter;

    fn where_exists<F>(self, relation: &RelationPath, scope: F) -> Self
    where
        F: FnOnce(Self::Scope) -> Self::Scope,
    {
        let conditions = scope(Filter::new()).into_predicates();
        self.push(Predicate::Exists {
            relation: relation.clone(),
            conditions,
        })
    }

    fn where_not_exists(self, relation: &RelationPath) -> Self {
        self.push(Predicate::NotExists {
            relation: relation.clone(),
        })
    }
}
