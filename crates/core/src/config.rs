//! Declarative dispatch configuration.
//!
//! The configuration file carries a `configurations:` list of raw rule
//! mappings. Rules stay untyped YAML values here; the dispatch crate
//! validates them field by field before any side effect occurs.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Top-level dispatch configuration: an ordered list of raw rules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DispatchConfig {
    /// Raw rule mappings, processed strictly in file order.
    #[serde(default)]
    pub configurations: Vec<serde_yaml::Value>,
}

impl DispatchConfig {
    /// Load from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Invalid(format!(
                "cannot read dispatch configuration {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_str(&raw)
    }

    /// Parse from a YAML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw)
            .map_err(|e| ConfigError::Invalid(format!("malformed dispatch configuration: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configurations_list() {
        let cfg = DispatchConfig::from_str(
            r#"
configurations:
  - type: email
    subject: "Alerts"
  - type: email
    subject: "More alerts"
"#,
        )
        .unwrap();

        assert_eq!(cfg.configurations.len(), 2);
        assert_eq!(
            cfg.configurations[0].get("subject").and_then(|v| v.as_str()),
            Some("Alerts")
        );
    }

    #[test]
    fn missing_list_defaults_to_empty() {
        let cfg = DispatchConfig::from_str("{}").unwrap();
        assert!(cfg.configurations.is_empty());
    }

    #[test]
    fn malformed_yaml_is_invalid() {
        let err = DispatchConfig::from_str("configurations: [").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
