//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::types::SizeRequest;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.conversion.default_quality) {
            return Err(ConfigError::ValidationError(
                "conversion.default_quality must be between 1 and 100".into(),
            ));
        }
        match self.conversion.default_size.parse::<SizeRequest>() {
            Ok(size) => {
                if crate::pipeline::resolve(&size).is_err() {
                    return Err(ConfigError::ValidationError(format!(
                        "conversion.default_size must be positive, got {size}"
                    )));
                }
            }
            Err(e) => {
                return Err(ConfigError::ValidationError(format!(
                    "conversion.default_size: {e}"
                )));
            }
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.convert_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.convert_timeout_ms must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(
                "logging.format must be \"pretty\" or \"json\"".into(),
            ));
        }
        Ok(())
    }
}
