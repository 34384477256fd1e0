//! Network configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// How memories treat an item they already hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// A repeated fact or token is neither stored nor forwarded again.
    #[default]
    Idempotent,
    /// Repeats are stored and forwarded, producing repeated tokens downstream.
    Cumulative,
}

/// Configuration for a [`crate::ReteNetwork`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Duplicate handling, applied to fact memories and token memories alike.
    pub duplicates: DuplicatePolicy,

    /// Emit an `info` event for every rule firing.
    pub log_firings: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::Idempotent,
            log_firings: false,
        }
    }
}

impl NetworkConfig {
    /// Parse a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.duplicates, DuplicatePolicy::Idempotent);
        assert!(!config.log_firings);
    }

    #[test]
    fn test_from_toml() {
        let config = NetworkConfig::from_toml_str(
            r#"
            duplicates = "cumulative"
            log_firings = true
            "#,
        )
        .unwrap();

        assert_eq!(config.duplicates, DuplicatePolicy::Cumulative);
        assert!(config.log_firings);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = NetworkConfig::from_toml_str("log_firings = true").unwrap();
        assert_eq!(config.duplicates, DuplicatePolicy::Idempotent);
        assert!(NetworkConfig::from_toml_str("").unwrap() == NetworkConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = NetworkConfig::from_toml_str(r#"duplicates = "sometimes""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = NetworkConfig::load("/nonexistent/rete.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
