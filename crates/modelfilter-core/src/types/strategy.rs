//! Filter strategies and per-entity filter configuration.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// The declared matching mode for a filterable search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Equality, or list membership for list values.
    Exact,
    /// Substring match: `%value%`.
    Partial,
    /// Prefix match: `value%`.
    Start,
    /// Suffix match: `%value`.
    End,
    /// Relation existence, driven by a boolean-like value.
    Exist,
}

impl Strategy {
    /// All strategies, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Exact,
        Self::Partial,
        Self::Start,
        Self::End,
        Self::Exist,
    ];

    /// Return the tag as written in filter configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial => "partial",
            Self::Start => "start",
            Self::End => "end",
            Self::Exist => "exist",
        }
    }

    /// Build the wildcard pattern for a pattern strategy.
    ///
    /// Returns `None` for strategies that do not match by pattern.
    pub fn pattern(&self, value: &str) -> Option<String> {
        match self {
            Self::Partial => Some(format!("%{value}%")),
            Self::Start => Some(format!("{value}%")),
            Self::End => Some(format!("%{value}")),
            Self::Exact | Self::Exist => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "partial" => Ok(Self::Partial),
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "exist" => Ok(Self::Exist),
            _ => Err(FilterError::validation(format!(
                "Invalid filter strategy: '{s}'. Expected one of: exact, partial, start, end, exist"
            ))),
        }
    }
}

/// Mapping from search key to strategy for one entity.
///
/// Keys not present here are not filterable; parameters naming them leave
/// the query untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterConfig {
    entries: HashMap<String, Strategy>,
}

impl FilterConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a search key.
    pub fn with(mut self, key: impl Into<String>, strategy: Strategy) -> Self {
        self.entries.insert(key.into(), strategy);
        self
    }

    /// Build a configuration from raw strategy tags.
    ///
    /// Unrecognised tags are dropped, so parameters naming those keys stay
    /// no-ops exactly like keys that were never configured.
    pub fn from_tags<I, K, V>(tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut config = Self::new();
        config.merge_tags(tags);
        config
    }

    /// Overlay raw strategy tags on top of this configuration.
    pub fn merge_tags<I, K, V>(&mut self, tags: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        for (key, tag) in tags {
            let key = key.into();
            match tag.as_ref().parse::<Strategy>() {
                Ok(strategy) => {
                    self.entries.insert(key, strategy);
                }
                Err(_) => {
                    tracing::debug!(key = %key, tag = tag.as_ref(), "Ignoring unknown filter strategy tag");
                    self.entries.remove(&key);
                }
            }
        }
    }

    /// Look up the strategy for a search key.
    pub fn strategy(&self, key: &str) -> Option<Strategy> {
        self.entries.get(key).copied()
    }

    /// Number of filterable keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key is filterable.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys and strategies, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Strategy)> {
        let mut entries: Vec<_> = self.entries.iter().map(|(k, s)| (k.as_str(), *s)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }
}
