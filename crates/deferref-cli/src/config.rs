//! Host configuration
//!
//! TOML file describing which catalog collaborators to bind at startup.
//!
//! ```toml
//! default_key = "catalog.primary"
//! log_filter = "info"
//!
//! [[bindings]]
//! key = "catalog.primary"
//! latency_ms = 5
//! connection = "memory://primary"
//! entries = [
//!     { id = 1, value = "portrait-001.jpg" },
//!     { id = 2, value = "portrait-002.jpg" },
//! ]
//! ```

use deferref_core::LocatorKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`HostConfig`]
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Binding key is empty
    #[error("binding #{index} has an empty key")]
    EmptyKey { index: usize },

    /// Two bindings share a key
    #[error("duplicate binding key: '{0}'")]
    DuplicateKey(String),

    /// Default key names no binding
    #[error("default key '{0}' has no binding")]
    DefaultKeyUnbound(String),
}

/// Top-level host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Key used when the caller names none
    pub default_key: String,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Collaborators bound at startup
    pub bindings: Vec<BindingConfig>,
}

/// One catalog collaborator binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Locator key to bind under
    pub key: String,
    /// Simulated upstream latency
    #[serde(default)]
    pub latency_ms: u64,
    /// Connection descriptor; internal collaborator state
    #[serde(default)]
    pub connection: String,
    /// Catalog contents
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryConfig {
    /// Member id
    pub id: u64,
    /// Deferred field value for that id
    pub value: String,
}

impl HostConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default key
    #[inline]
    #[must_use]
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = key.into();
        self
    }

    /// With an extra binding
    #[inline]
    #[must_use]
    pub fn with_binding(mut self, binding: BindingConfig) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check keys are non-empty, unique, and the default key is bound
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (index, binding) in self.bindings.iter().enumerate() {
            let key = binding.locator_key().map_err(|_| ConfigError::EmptyKey { index })?;
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateKey(binding.key.trim().to_string()));
            }
        }
        if !self.bindings.is_empty() && !seen.contains(self.default_key.trim()) {
            return Err(ConfigError::DefaultKeyUnbound(self.default_key.clone()));
        }
        Ok(())
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            default_key: "catalog.primary".to_string(),
            log_filter: "info".to_string(),
            bindings: Vec::new(),
        }
    }
}

impl BindingConfig {
    /// Create binding with no entries
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            latency_ms: 0,
            connection: String::new(),
            entries: Vec::new(),
        }
    }

    /// With catalog entry
    #[must_use]
    pub fn with_entry(mut self, id: u64, value: impl Into<String>) -> Self {
        self.entries.push(EntryConfig {
            id,
            value: value.into(),
        });
        self
    }

    /// Parsed locator key
    ///
    /// # Errors
    /// Fails when the key is empty or blank.
    pub fn locator_key(&self) -> Result<LocatorKey, deferref_core::RegistryError> {
        self.key.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_key = "catalog.primary"
log_filter = "debug"

[[bindings]]
key = "catalog.primary"
latency_ms = 5
connection = "memory://primary"
entries = [
    { id = 1, value = "portrait-001.jpg" },
    { id = 2, value = "portrait-002.jpg" },
]

[[bindings]]
key = "catalog.archive"
"#;

    #[test]
    fn parse_sample() {
        let config = HostConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.bindings.len(), 2);
        assert_eq!(config.bindings[0].entries[1].value, "portrait-002.jpg");
        assert_eq!(config.bindings[1].latency_ms, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let config = HostConfig::new()
            .with_binding(BindingConfig::new("catalog.primary"))
            .with_binding(BindingConfig::new(" catalog.primary "));
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateKey(k)) if k == "catalog.primary"));
    }

    #[test]
    fn rejects_blank_key() {
        let config = HostConfig::new().with_binding(BindingConfig::new("  "));
        assert!(matches!(config.validate(), Err(ConfigError::EmptyKey { index: 0 })));
    }

    #[test]
    fn rejects_unbound_default() {
        let config = HostConfig::new()
            .with_default_key("catalog.missing")
            .with_binding(BindingConfig::new("catalog.primary"));
        assert!(matches!(config.validate(), Err(ConfigError::DefaultKeyUnbound(_))));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            HostConfig::from_toml_str("bindings = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
