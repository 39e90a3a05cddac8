//! Core plugin configuration.

#[cfg(feature = "serde")]
use std::path::Path;

#[cfg(feature = "serde")]
use crate::error::{Error, Result};

/// Options read by the core plugin at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case", default))]
pub struct CoreConfig {
    /// Permission groups to create on startup, highest priority first.
    pub default_groups: Vec<String>,
    /// Whether the server is listed as modded.
    pub modded: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_groups: vec!["default".to_string(), "admin".to_string()],
            modded: false,
        }
    }
}

impl CoreConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default groups.
    pub fn with_default_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the modded listing flag.
    pub fn with_modded(mut self, modded: bool) -> Self {
        self.modded = modded;
        self
    }

    /// Load configuration from a file. `.json` files are parsed as JSON,
    /// anything else as TOML.
    #[cfg(feature = "serde")]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    /// Parse configuration from a TOML string.
    #[cfg(feature = "serde")]
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Parse configuration from a JSON string.
    #[cfg(feature = "serde")]
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Serialize to a JSON string.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.default_groups, vec!["default", "admin"]);
        assert!(!config.modded);
    }

    #[test]
    fn test_config_builder() {
        let config = CoreConfig::new()
            .with_default_groups(["admin", "default", "vip"])
            .with_modded(true);

        assert_eq!(config.default_groups.len(), 3);
        assert!(config.modded);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_toml() {
        let toml = r#"
default-groups = ["admin", "default", "vip"]
modded = true
"#;

        let config = CoreConfig::from_toml(toml).unwrap();
        assert_eq!(config.default_groups, vec!["admin", "default", "vip"]);
        assert!(config.modded);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_missing_keys_use_defaults() {
        let config = CoreConfig::from_toml("modded = true").unwrap();
        assert_eq!(config.default_groups, vec!["default", "admin"]);

        assert!(CoreConfig::from_toml("modded = \"yes\"").is_err());
    }
}
