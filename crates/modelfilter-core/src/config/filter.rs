//! Filter behaviour settings.

use serde::{Deserialize, Serialize};

/// Settings shared by the compiler and the query backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Match pattern strategies case-insensitively (`ILIKE` on PostgreSQL).
    #[serde(default)]
    pub case_insensitive: bool,
    /// Escape `%`, `_` and `\` in requested values before building patterns.
    ///
    /// Off by default: requested values are spliced into the pattern as-is,
    /// so callers may use wildcards themselves.
    #[serde(default)]
    pub escape_wildcards: bool,
    /// Maximum number of tables whose column sets are cached.
    #[serde(default = "default_schema_cache_capacity")]
    pub schema_cache_capacity: u64,
    /// How long a cached column set stays valid, in seconds.
    #[serde(default = "default_schema_cache_ttl")]
    pub schema_cache_ttl_seconds: u64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            escape_wildcards: false,
            schema_cache_capacity: default_schema_cache_capacity(),
            schema_cache_ttl_seconds: default_schema_cache_ttl(),
        }
    }
}

fn default_schema_cache_capacity() -> u64 {
    256
}

fn default_schema_cache_ttl() -> u64 {
    300
}
