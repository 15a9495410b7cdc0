//! Configuration types and loading
//!
//! Ambient defaults supplied once when a builder is constructed.

use serde::{Deserialize, Serialize};

use crate::types::{Dialect, SortDirection};

pub const ENV_DEFAULT_SORT: &str = "CONTENT_QUERY_DEFAULT_SORT";
pub const ENV_DEFAULT_DIALECT: &str = "CONTENT_QUERY_DEFAULT_DIALECT";

/// Builder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Direction used when a sort is added without an explicit direction
    pub default_sort: SortDirection,
    /// Dialect produced by `build()` without an explicit dialect
    pub default_dialect: Dialect,
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl BuilderConfig {
    /// Create with an explicit default sort direction
    pub fn with_default_sort(mut self, direction: SortDirection) -> Self {
        self.default_sort = direction;
        self
    }

    /// Create with an explicit default dialect
    pub fn with_default_dialect(mut self, dialect: Dialect) -> Self {
        self.default_dialect = dialect;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEFAULT_SORT) {
            config.default_sort = value.parse().map_err(|e: crate::QueryError| {
                ConfigError::InvalidValue {
                    key: ENV_DEFAULT_SORT.to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(ENV_DEFAULT_DIALECT) {
            config.default_dialect = value.parse().map_err(|e: crate::QueryError| {
                ConfigError::InvalidValue {
                    key: ENV_DEFAULT_DIALECT.to_string(),
                    message: e.to_string(),
                }
            })?;
        }

        tracing::debug!(
            default_sort = %config.default_sort,
            default_dialect = %config.default_dialect,
            "Builder configuration loaded"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.default_sort, SortDirection::Asc);
        assert_eq!(config.default_dialect, Dialect::Service);
    }

    #[test]
    fn test_from_vars() {
        let env = vars(&[(ENV_DEFAULT_SORT, "desc"), (ENV_DEFAULT_DIALECT, "rest")]);
        let config = BuilderConfig::from_vars(|key| env.get(key).cloned()).unwrap();
        assert_eq!(config.default_sort, SortDirection::Desc);
        assert_eq!(config.default_dialect, Dialect::Rest);
    }

    #[test]
    fn test_from_vars_missing_uses_defaults() {
        let config = BuilderConfig::from_vars(|_| None).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_from_vars_invalid() {
        let env = vars(&[(ENV_DEFAULT_SORT, "sideways")]);
        let err = BuilderConfig::from_vars(|key| env.get(key).cloned()).unwrap_err();
        assert!(err.to_string().contains(ENV_DEFAULT_SORT));
    }

    #[test]
    fn test_builder_methods() {
        let config = BuilderConfig::default()
            .with_default_sort(SortDirection::Desc)
            .with_default_dialect(Dialect::Engine);
        assert_eq!(config.default_sort, SortDirection::Desc);
        assert_eq!(config.default_dialect, Dialect::Engine);
    }
}
