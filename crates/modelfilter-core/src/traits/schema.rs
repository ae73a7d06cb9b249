//! Schema introspection trait.

use async_trait::async_trait;

use crate::result::FilterResult;

/// Answers whether a table has a given column.
///
/// Implementations report an unknown table as an error rather than `false`;
/// the compiler propagates it unchanged.
#[async_trait]
pub trait SchemaIntrospector: Send + Sync {
    /// Check whether `table` has a column named `column`.
    async fn has_column(&self, table: &str, column: &str) -> FilterResult<bool>;
}
