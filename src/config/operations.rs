//! Config loading, validation, and derived values.

use super::model::Config;
use crate::error::{EditLockError, Result};
use chrono::Duration;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(EditLockError::ConfigError)` - Read, parse, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            EditLockError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config if the file exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml treats an empty document as null rather than an empty map.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                EditLockError::ConfigError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            EditLockError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// - `expiration_window_seconds` must be positive
    /// - `warning_window_seconds` must be below `expiration_window_seconds`
    /// - `default_holder`, when set, must not be blank
    pub fn validate(&self) -> Result<()> {
        if self.expiration_window_seconds == 0 {
            return Err(EditLockError::ConfigError(
                "expiration_window_seconds must be greater than 0".to_string(),
            ));
        }

        if self.warning_window_seconds >= self.expiration_window_seconds {
            return Err(EditLockError::ConfigError(format!(
                "warning_window_seconds ({}) must be less than expiration_window_seconds ({})",
                self.warning_window_seconds, self.expiration_window_seconds
            )));
        }

        if let Some(holder) = &self.default_holder
            && holder.trim().is_empty()
        {
            return Err(EditLockError::ConfigError(
                "default_holder must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// The expiration window as a duration.
    pub fn expiration_window(&self) -> Duration {
        Duration::seconds(i64::from(self.expiration_window_seconds))
    }

    /// The warning window as a duration.
    pub fn warning_window(&self) -> Duration {
        Duration::seconds(i64::from(self.warning_window_seconds))
    }
}
