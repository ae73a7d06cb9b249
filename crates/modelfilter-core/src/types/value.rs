//! Requested filter values.
//!
//! A query parameter carries either nothing, one scalar, or an ordered list
//! of scalars. Coercions are explicit: strategies never rely on loose
//! equality between representations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// A single requested value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A text value. Everything decoded from a query string lands here.
    Text(String),
}

impl Scalar {
    /// Return the value as text, the way it is spliced into a pattern.
    pub fn to_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Interpret the scalar as a presence flag.
    ///
    /// `true`, `1`, `"1"` and `"true"` mean present; `false`, `0`, `"0"` and
    /// `"false"` mean absent. Anything else is not a flag.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(1) => Some(true),
            Self::Int(0) => Some(false),
            Self::Text(s) => match s.as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
            Self::Int(_) | Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl TryFrom<serde_json::Value> for Scalar {
    type Error = FilterError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    FilterError::validation(format!("Unsupported numeric filter value: {n}"))
                }),
            },
            Value::String(s) => Ok(Self::Text(s)),
            Value::Null => Err(FilterError::validation(
                "Null is not allowed inside a filter value list",
            )),
            Value::Array(_) | Value::Object(_) => Err(FilterError::validation(
                "Nested structures are not allowed inside a filter value list",
            )),
        }
    }
}

/// The value requested for one query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// The parameter was present without a value.
    Null,
    /// A single value.
    Scalar(Scalar),
    /// An ordered list of values.
    List(Vec<Scalar>),
}

impl FilterValue {
    /// Build a text scalar.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(value.into()))
    }

    /// Build a list of text scalars.
    pub fn texts<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(|v| Scalar::Text(v.into())).collect())
    }

    /// Tri-state coercion used by the `exist` strategy.
    ///
    /// A missing value counts as "present". Lists and unrecognised tokens
    /// yield `None`, which callers treat as "leave the query alone".
    pub fn presence(&self) -> Option<bool> {
        match self {
            Self::Null => Some(true),
            Self::Scalar(s) => s.as_flag(),
            Self::List(_) => None,
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<Vec<Scalar>> for FilterValue {
    fn from(value: Vec<Scalar>) -> Self {
        Self::List(value)
    }
}

impl TryFrom<serde_json::Value> for FilterValue {
    type Error = FilterError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Array(items) => items
                .into_iter()
                .map(Scalar::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(_) => Err(FilterError::validation(
                "Associative structures are not valid filter values",
            )),
            other => Scalar::try_from(other).map(Self::Scalar),
        }
    }
}
