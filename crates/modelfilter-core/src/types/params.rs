//! Ordered query parameter sets.

use serde::Serialize;

use super::value::{FilterValue, Scalar};
use crate::error::FilterError;

/// Query parameters in insertion order.
///
/// Insertion order is the order predicates are folded into the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryParams {
    entries: Vec<(String, FilterValue)>,
}

impl QueryParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a parameter. A replaced parameter keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Append a scalar to a list parameter, creating or widening it.
    pub fn append(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, FilterValue::List(items))) => items.push(value),
            Some(entry) => {
                let previous = std::mem::replace(&mut entry.1, FilterValue::Null);
                let mut items = match previous {
                    FilterValue::Scalar(s) => vec![s],
                    FilterValue::Null | FilterValue::List(_) => Vec::new(),
                };
                items.push(value);
                entry.1 = FilterValue::List(items);
            }
            None => self.entries.push((name, FilterValue::List(vec![value]))),
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode an `application/x-www-form-urlencoded` query string.
    ///
    /// `name[]=v` and `name[0]=v` build lists, a repeated plain `name`
    /// replaces the earlier value, and an empty value becomes
    /// [`FilterValue::Null`]. An empty list item only yields `Null` when
    /// the list has no other items. Associative brackets (`name[key]=v`)
    /// are rejected.
    pub fn from_query_str(query: &str) -> Result<Self, FilterError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::new();

        for (raw_name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match split_brackets(&raw_name)? {
                (name, true) => {
                    if !value.is_empty() {
                        params.append(name, Scalar::Text(value.into_owned()));
                    } else if params.get(name).is_none() {
                        params.insert(name, FilterValue::Null);
                    }
                }
                (name, false) => {
                    if value.is_empty() {
                        params.insert(name, FilterValue::Null);
                    } else {
                        params.insert(name, FilterValue::text(value.into_owned()));
                    }
                }
            }
        }

        Ok(params)
    }

    /// Build parameters from a JSON object.
    ///
    /// Order follows the key order of the JSON document.
    pub fn from_json(value: serde_json::Value) -> Result<Self, FilterError> {
        let serde_json::Value::Object(map) = value else {
            return Err(FilterError::validation(
                "Filter parameters must be a JSON object",
            ));
        };

        let mut params = Self::new();
        for (name, value) in map {
            params.insert(name, FilterValue::try_from(value)?);
        }
        Ok(params)
    }
}

impl<K: Into<String>, V: Into<FilterValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Split `name[...]` into the bare name and whether it denotes a list item.
fn split_brackets(raw: &str) -> Result<(&str, bool), FilterError> {
    let Some(open) = raw.find('[') else {
        return Ok((raw, false));
    };

    let (name, rest) = raw.split_at(open);
    let index = rest
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .ok_or_else(|| FilterError::validation(format!("Malformed parameter name '{raw}'")))?;

    if index.is_empty() || index.bytes().all(|b| b.is_ascii_digit()) {
        Ok((name, true))
    } else {
        Err(FilterError::validation(format!(
            "Associative parameter '{raw}' is not a valid filter value"
        )))
    }
}
