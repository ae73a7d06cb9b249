//! Search key parsing and target resolution.
//!
//! A search key such as `"author:profile:email"` names a property reached
//! through zero or more relations. Resolution is pure: callers supply the
//! answer to "is this a column of the base table" and get back where the
//! predicate must be applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Delimiters accepted between search key segments.
const SEGMENT_DELIMITERS: [char; 2] = [':', '.'];

/// An ordered sequence of relation names, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationPath(Vec<String>);

impl RelationPath {
    /// Create a path from segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Treat an entire search key as a relation path.
    pub fn from_key(key: &str) -> Self {
        Self::new(split_segments(key))
    }

    /// The relation names, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether the path names no relation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of relation hops.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A parsed search key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKey {
    /// The key exactly as it appeared in the parameters.
    pub raw: String,
    /// Relations to traverse before reaching the property.
    pub relation: RelationPath,
    /// The terminal column or nested property.
    pub property: String,
}

impl SearchKey {
    /// Split a key into its relation path and terminal property.
    pub fn parse(key: &str) -> Self {
        let mut segments = split_segments(key);
        let property = segments.pop().unwrap_or_default();
        Self {
            raw: key.to_string(),
            relation: RelationPath::new(segments),
            property,
        }
    }

    /// Whether the key addresses the base entity directly.
    pub fn is_local(&self) -> bool {
        self.relation.is_empty()
    }
}

/// Where a property predicate applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A column on the base table.
    Column(String),
    /// A property on a related entity, applied inside an existence scope.
    Related {
        /// Path from the base entity to the related entity.
        relation: RelationPath,
        /// The property on the related entity.
        property: String,
    },
}

impl Target {
    /// Resolve a key given whether its property is a base-table column.
    ///
    /// `column_exists` is only meaningful for local keys; keys with a
    /// relation path always resolve into the relation scope.
    pub fn resolve(key: SearchKey, column_exists: bool) -> Result<Self, FilterError> {
        if key.property.is_empty() {
            return Err(FilterError::validation(format!(
                "Filter key '{}' has no property name",
                key.raw
            )));
        }

        if !key.is_local() {
            return Ok(Self::Related {
                relation: key.relation,
                property: key.property,
            });
        }

        if column_exists {
            Ok(Self::Column(key.property))
        } else {
            Err(FilterError::validation(format!(
                "Unknown filter property '{}': not a column and no relation path",
                key.raw
            )))
        }
    }
}

fn split_segments(key: &str) -> Vec<String> {
    key.split(SEGMENT_DELIMITERS)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
