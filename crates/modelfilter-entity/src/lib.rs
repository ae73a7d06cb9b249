//! # modelfilter-entity
//!
//! A small blog schema used to exercise modelfilter: posts with authors,
//! tags, and comments. Every struct represents a database table row and
//! derives `sqlx::FromRow`; every entity implements
//! [`Filterable`](modelfilter_core::traits::Filterable) with static table
//! metadata and its filter declarations.

pub mod author;
pub mod comment;
pub mod post;
pub mod registry;
pub mod tag;

pub use author::{Author, Profile};
pub use comment::Comment;
pub use post::Post;
pub use tag::Tag;
