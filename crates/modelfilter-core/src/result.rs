//! Convenience result type alias for modelfilter.

use crate::error::FilterError;

/// A specialized `Result` type for filter operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, FilterError>` explicitly.
pub type FilterResult<T> = Result<T, FilterError>;
