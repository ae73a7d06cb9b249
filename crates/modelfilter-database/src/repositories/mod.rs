//! Repositories built on the filter compiler.

pub mod filter;

pub use filter::FilterRepository;
