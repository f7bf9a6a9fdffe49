//! Session configuration and the loader that reads it from a configuration root.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Configuration root used when `create` is called without one.
///
/// Relative, so it resolves against the host's working directory.
pub const DEFAULT_CONFIG_ROOT: &str = "../../Config";

/// File read from the configuration root.
pub const CONFIG_FILE_NAME: &str = "tracker.json";

/// Configuration for one tracker session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tracker engine variant key.
    pub tracker: String,
    /// Preprocessing pipeline variant key.
    pub pre_proc: String,
    /// Re-seed the engine template from its own estimate after each update.
    pub reset_template: bool,
    /// Log tracking rate after each update.
    pub print_fps: bool,
    /// Search window half-size in pixels for the template engine.
    pub search_radius: usize,
    /// Fixed patch size handed to interactive selectors, 0 for free selection.
    pub patch_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tracker: "template".to_string(),
            pre_proc: "gauss".to_string(),
            reset_template: false,
            print_fps: false,
            search_radius: 8,
            patch_size: 0,
        }
    }
}

impl SessionConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: SessionConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.trim().is_empty() {
            return Err(ConfigError::invalid_value("tracker", "must not be empty"));
        }
        if self.pre_proc.trim().is_empty() {
            return Err(ConfigError::invalid_value("pre_proc", "must not be empty"));
        }
        if self.search_radius == 0 {
            return Err(ConfigError::invalid_value("search_radius", "must be > 0"));
        }
        Ok(())
    }
}

/// Source of session configurations, keyed by configuration root directory.
pub trait ConfigSource {
    fn load(&self, root: &Path) -> Result<SessionConfig, ConfigError>;
}

/// Reads `tracker.json` from the configuration root.
///
/// A root without the file yields the default configuration.
#[derive(Debug, Clone, Default)]
pub struct JsonConfigSource;

impl JsonConfigSource {
    /// Location of the configuration file under `root`.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }
}

impl ConfigSource for JsonConfigSource {
    fn load(&self, root: &Path) -> Result<SessionConfig, ConfigError> {
        let path = Self::config_path(root);
        if !path.exists() {
            log::warn!(
                "no configuration file at {}, using default parameters",
                path.display()
            );
            return Ok(SessionConfig::default());
        }
        SessionConfig::from_json(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = JsonConfigSource.load(dir.path()).unwrap();
        assert_eq!(cfg, SessionConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "tracker": "static", "reset_template": true }"#,
        )
        .unwrap();

        let cfg = JsonConfigSource.load(dir.path()).unwrap();
        assert_eq!(cfg.tracker, "static");
        assert!(cfg.reset_template);
        assert_eq!(cfg.pre_proc, "gauss");
        assert_eq!(cfg.search_radius, 8);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").unwrap();

        let err = JsonConfigSource.load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_radius() {
        let cfg = SessionConfig {
            search_radius: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidValue {
                field: "search_radius",
                ..
            })
        ));
    }
}
