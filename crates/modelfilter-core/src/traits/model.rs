//! Entity trait for filterable models.

use crate::types::relation::EntityMeta;
use crate::types::strategy::FilterConfig;

/// A table-backed entity that declares which search keys can be filtered.
pub trait Filterable {
    /// Static table, column, and relation metadata.
    fn meta() -> &'static EntityMeta;

    /// Search key to strategy mapping for this entity.
    fn filters() -> FilterConfig;

    /// Table name, shorthand for `Self::meta().table`.
    fn table() -> &'static str {
        Self::meta().table
    }
}
