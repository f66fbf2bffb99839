//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Conversion defaults applied when a request leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// WebP quality (1-100)
    pub default_quality: u32,

    /// Preset name or WIDTHxHEIGHT
    pub default_size: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_quality: 80,
            default_size: "header".to_string(),
        }
    }
}

/// Resource limits to protect against problematic uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum source dimension (width or height)
    pub max_image_dimension: u32,

    /// Upper bound for one conversion in milliseconds (enforced by callers)
    pub convert_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            max_image_dimension: 10000,
            convert_timeout_ms: 30000,
        }
    }
}

/// Filesystem asset store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory converted images are saved into
    pub dir: PathBuf,

    /// Public URL prefix for saved files; empty means `file://` URLs
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("~/.webpress/uploads"),
            base_url: String::new(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON reports
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
