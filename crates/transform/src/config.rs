//! Transformation settings.

use cxapi_core::vocabulary::XAPI_VERSION;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting has an unusable value
    #[error("Invalid setting {0}: {1}")]
    Invalid(&'static str, String),
}

/// Settings shared by every transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Root URL of the learning platform; prefixes every object IRI and is
    /// the actor account home page
    pub platform_url: String,

    /// Statement format version
    pub xapi_version: String,

    /// Value of the transformer-version context extension
    pub transformer_version: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            platform_url: "http://localhost:18000".to_string(),
            xapi_version: XAPI_VERSION.to_string(),
            transformer_version: format!("cxapi@{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransformConfig {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the platform root URL.
    pub fn with_platform_url(mut self, url: impl Into<String>) -> Self {
        self.platform_url = url.into();
        self
    }

    /// Check that the settings can produce valid statements.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platform_url.trim().is_empty() {
            return Err(ConfigError::Invalid("platform_url", "must not be empty".to_string()));
        }
        if self.xapi_version.trim().is_empty() {
            return Err(ConfigError::Invalid("xapi_version", "must not be empty".to_string()));
        }
        Ok(())
    }

    /// Platform URL without a trailing slash.
    pub fn root_url(&self) -> &str {
        self.platform_url.trim_end_matches('/')
    }

    /// Build an object IRI under `namespace`.
    ///
    /// Returns `None` when there is no identifier to place in it.
    pub fn object_iri(&self, namespace: &str, identifier: Option<&str>) -> Option<String> {
        let identifier = identifier.filter(|id| !id.trim().is_empty())?;
        Some(format!("{}/{}/{}", self.root_url(), namespace, identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_object_iri() {
        let config = TransformConfig::default().with_platform_url("https://lms.example.com/");
        assert_eq!(
            config.object_iri("xblock", Some("b1")).as_deref(),
            Some("https://lms.example.com/xblock/b1")
        );
        assert!(config.object_iri("xblock", None).is_none());
        assert!(config.object_iri("xblock", Some("")).is_none());
    }

    #[test]
    fn test_object_iri_rejects_blank_identifier() {
        let config = TransformConfig::default();
        assert!(config.object_iri("xblock", Some("  ")).is_none());
        assert!(config.object_iri("courses", Some("\t\n")).is_none());
    }

    #[test]
    fn test_from_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"platform_url": "https://lms.example.com"}}"#).unwrap();

        let config = TransformConfig::from_file(file.path()).unwrap();
        assert_eq!(config.platform_url, "https://lms.example.com");
        assert_eq!(config.xapi_version, XAPI_VERSION);
        assert!(config.transformer_version.starts_with("cxapi@"));
    }

    #[test]
    fn test_from_file_rejects_empty_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"platform_url": "  "}}"#).unwrap();

        let err = TransformConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("platform_url", _)));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TransformConfig::from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
