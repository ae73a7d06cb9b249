//! # modelfilter-database
//!
//! PostgreSQL collaborator for modelfilter: connection management, cached
//! column introspection, a [`SqlQuery`] that renders compiled filters through
//! `sqlx::QueryBuilder`, and a repository exposing the filter entry points
//! per entity.

pub mod connection;
pub mod migration;
pub mod query;
pub mod repositories;
pub mod schema;

pub use connection::DatabasePool;
pub use query::SqlQuery;
pub use repositories::FilterRepository;
pub use schema::PgSchemaIntrospector;
