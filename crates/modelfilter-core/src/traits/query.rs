//! Query-builder traits.
//!
//! The compiler only ever talks to a query through these traits, so any
//! builder that can express equality, membership, pattern matching, and
//! relation existence can sit underneath it.

use async_trait::async_trait;

use crate::result::FilterResult;
use crate::types::key::RelationPath;
use crate::types::value::Scalar;

/// Column-level constraints, usable at the top level or inside a relation scope.
///
/// Every call adds one constraint combined with `AND` to those already present.
pub trait ConditionSink: Sized {
    /// `column = value`.
    fn where_eq(self, column: &str, value: Scalar) -> Self;

    /// `column IS NULL`.
    fn where_null(self, column: &str) -> Self;

    /// `column IN (values)`. An empty list matches nothing.
    fn where_in(self, column: &str, values: Vec<Scalar>) -> Self;

    /// `column LIKE pattern`.
    fn where_like(self, column: &str, pattern: String) -> Self;

    /// `(column LIKE p1 OR column LIKE p2 ...)`, grouped as one constraint.
    fn where_any_like(self, column: &str, patterns: Vec<String>) -> Self;
}

/// A composable, not-yet-executed query over one entity.
pub trait QueryContext: ConditionSink + Send {
    /// Builder for constraints applied inside a relation scope.
    type Scope: ConditionSink + Default;

    /// Require at least one related row along `relation` satisfying `scope`.
    fn where_exists<F>(self, relation: &RelationPath, scope: F) -> Self
    where
        F: FnOnce(Self::Scope) -> Self::Scope;

    /// Require no related row along `relation`.
    fn where_not_exists(self, relation: &RelationPath) -> Self;
}

/// A query that can be executed into a result set.
#[async_trait]
pub trait Materialize: QueryContext {
    /// The materialized result set.
    type Output: Send;

    /// Execute the query and collect every matching row.
    async fn fetch_all(self) -> FilterResult<Self::Output>;
}
