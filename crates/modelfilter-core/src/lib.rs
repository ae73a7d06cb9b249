//! # modelfilter-core
//!
//! Core crate for modelfilter. Turns a flat set of request query parameters
//! into query constraints, driven by a per-entity map of search keys to
//! filter strategies. Contains the value model, search key resolution, the
//! predicate compiler, the collaborator traits a query backend implements,
//! an in-memory backend, configuration schemas, and the unified error type.
//!
//! This crate has **no** dependency on a database driver.

pub mod compiler;
pub mod config;
pub mod error;
pub mod memory;
pub mod predicate;
pub mod result;
pub mod schema;
pub mod traits;
pub mod types;

pub use compiler::{Compiled, PredicateCompiler};
pub use error::FilterError;
pub use predicate::{Filter, Predicate};
pub use result::FilterResult;
