//! Collaborator traits defined in `modelfilter-core` and implemented by
//! query backends.

pub mod model;
pub mod query;
pub mod schema;

pub use model::Filterable;
pub use query::{ConditionSink, Materialize, QueryContext};
pub use schema::SchemaIntrospector;
