// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Metadata layer configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Metadata layer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaConfig {
    /// Code container searched first during introspection.
    #[serde(default = "default_core_container")]
    pub core_container: String,

    /// Discriminator key carrying the type name in serialized records.
    #[serde(default = "default_type_field")]
    pub type_field: String,

    /// `chrono` format used when a date-time is rendered into a template.
    #[serde(default = "default_date_time_format")]
    pub date_time_format: String,

    /// Maximum number of segments in a dotted property path.
    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,
}

fn default_core_container() -> String {
    "core".to_string()
}

fn default_type_field() -> String {
    "$type".to_string()
}

fn default_date_time_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_max_path_depth() -> usize {
    32
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            core_container: default_core_container(),
            type_field: default_type_field(),
            date_time_format: default_date_time_format(),
            max_path_depth: default_max_path_depth(),
        }
    }
}

impl MetaConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.core_container.trim().is_empty() {
            return Err(ConfigError::Invalid("core_container must not be empty".into()));
        }
        if self.type_field.is_empty() {
            return Err(ConfigError::Invalid("type_field must not be empty".into()));
        }
        if self.date_time_format.is_empty() {
            return Err(ConfigError::Invalid(
                "date_time_format must not be empty".into(),
            ));
        }
        if StrftimeItems::new(&self.date_time_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "date_time_format '{}' is not a valid strftime pattern",
                self.date_time_format
            )));
        }
        if self.max_path_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_path_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MetaConfig::default();
        assert_eq!(config.core_container, "core");
        assert_eq!(config.type_field, "$type");
        assert_eq!(config.max_path_depth, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MetaConfig::from_toml_str("core_container = \"runtime\"\n").unwrap();
        assert_eq!(config.core_container, "runtime");
        assert_eq!(config.type_field, "$type");
        assert_eq!(config.date_time_format, "%Y-%m-%d %H:%M:%S");
    }

    #[test]
    fn test_invalid_depth_rejected() {
        let err = MetaConfig::from_toml_str("max_path_depth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_date_format_rejected() {
        let err = MetaConfig::from_toml_str("date_time_format = \"%Y %\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "type_field = \"kind\"").unwrap();
        writeln!(file, "max_path_depth = 4").unwrap();

        let config = MetaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.type_field, "kind");
        assert_eq!(config.max_path_depth, 4);
    }

    #[test]
    fn test_missing_file() {
        let err = MetaConfig::from_file("/nonexistent/typemeta.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
