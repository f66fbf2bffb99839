//! Configuration management for webpress.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. All config structs implement `Default`.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::types::{Quality, SizeRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for webpress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion defaults
    pub conversion: ConversionConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Asset store settings
    pub storage: StorageConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.webpress.webpress/config.toml
    /// - Linux: ~/.config/webpress/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\webpress\config\config.toml
    ///
    /// Falls back to ~/.webpress/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "webpress", "webpress")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".webpress").join("config.toml")
            })
    }

    /// Get the resolved storage directory (with ~ expansion).
    pub fn storage_dir(&self) -> PathBuf {
        let path_str = self.storage.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Default quality as a clamped [`Quality`].
    pub fn default_quality(&self) -> Quality {
        Quality::new(self.conversion.default_quality)
    }

    /// Default size request. Falls back to the header preset if unparsable.
    pub fn default_size(&self) -> SizeRequest {
        self.conversion.default_size.parse().unwrap_or_default()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SizePreset;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.conversion.default_quality, 80);
        assert_eq!(config.limits.max_file_size_mb, 50);
        assert_eq!(config.default_size(), SizeRequest::Preset(SizePreset::Header));
        assert_eq!(config.default_quality().value(), 80);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[conversion]"));
        assert!(toml.contains("[limits]"));
        assert!(toml.contains("[storage]"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[conversion]\ndefault_quality = 65\ndefault_size = \"640x480\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_quality().value(), 65);
        assert_eq!(
            config.default_size(),
            SizeRequest::Custom {
                width: 640,
                height: 480
            }
        );
        // Untouched sections keep their defaults
        assert_eq!(config.limits.max_image_dimension, 10000);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_file_size_mb = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_storage_dir_expands_tilde() {
        let config = Config::default();
        let dir = config.storage_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with(".webpress/uploads"));
    }
}
