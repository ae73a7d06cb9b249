//! Core type definitions used across the modelfilter workspace.

pub mod key;
pub mod pagination;
pub mod params;
pub mod relation;
pub mod sorting;
pub mod strategy;
pub mod value;

pub use key::{RelationPath, SearchKey, Target};
pub use pagination::{PageRequest, PageResponse};
pub use params::QueryParams;
pub use relation::{EntityMeta, RelationKind, RelationMeta};
pub use sorting::{SortDirection, SortField};
pub use strategy::{FilterConfig, Strategy};
pub use value::{FilterValue, Scalar};
