//! Sorting types for composing deferred filter queries.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort specification consisting of a column name and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Column to sort by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Create an ascending sort on the given column.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Create a descending sort on the given column.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl FromStr for SortField {
    type Err = FilterError;

    /// Parse `column`, `column:asc`, or `column:desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => match dir.to_lowercase().as_str() {
                "asc" => (field, SortDirection::Asc),
                "desc" => (field, SortDirection::Desc),
                _ => {
                    return Err(FilterError::validation(format!(
                        "Invalid sort direction '{dir}'. Expected asc or desc"
                    )));
                }
            },
            None => (s, SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(FilterError::validation("Sort column must not be empty"));
        }
        Ok(Self::new(field, direction))
    }
}
