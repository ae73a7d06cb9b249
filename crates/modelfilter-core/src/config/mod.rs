//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod filter;
pub mod logging;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::filter::FilterSettings;
pub use self::logging::LoggingConfig;

use crate::error::FilterError;
use crate::types::strategy::FilterConfig;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Filter behaviour settings.
    #[serde(default)]
    pub filter: FilterSettings,
    /// Per-table strategy tags layered over each entity's own filters.
    #[serde(default)]
    pub overrides: HashMap<String, HashMap<String, String>>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `<dir>/default.toml` with an environment-specific overlay and
    /// environment variables prefixed with `MODELFILTER__`.
    pub fn load(dir: &str, env: &str) -> Result<Self, FilterError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MODELFILTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| FilterError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| FilterError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Apply configured overrides for `table` to an entity's filters.
    pub fn filters_for(&self, table: &str, base: FilterConfig) -> FilterConfig {
        let mut filters = base;
        if let Some(tags) = self.overrides.get(table) {
            filters.merge_tags(tags.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::strategy::Strategy;

    #[test]
    fn test_defaults_without_files() {
        let config = AppConfig::load("does/not/exist", "test").unwrap();
        assert!(!config.filter.case_insensitive);
        assert!(!config.filter.escape_wildcards);
        assert_eq!(config.logging.level, "warn");
        assert!(config.overrides.is_empty());
    }

    #[test]
    fn test_filters_for_merges_overrides() {
        let mut config = AppConfig::default();
        config.overrides.insert(
            "posts".to_string(),
            HashMap::from([
                ("body".to_string(), "partial".to_string()),
                ("status".to_string(), "off".to_string()),
            ]),
        );

        let base = FilterConfig::new().with("status", Strategy::Exact);
        let merged = config.filters_for("posts", base.clone());
        assert_eq!(merged.strategy("body"), Some(Strategy::Partial));
        assert_eq!(merged.strategy("status"), None);

        assert_eq!(config.filters_for("tags", base.clone()), base);
    }
}
