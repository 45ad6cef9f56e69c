//! Configuration validation.

use crate::config::types::PoplineConfig;
use crate::errors::ConfigError;

/// Smallest accepted popup dimension in pixels.
pub const MIN_WINDOW_DIMENSION: u32 = 50;

/// Largest accepted popup dimension in pixels.
pub const MAX_WINDOW_DIMENSION: u32 = 4096;

/// Smallest accepted bridge timeout in milliseconds.
pub const MIN_BRIDGE_TIMEOUT_MS: u64 = 500;

/// Largest accepted bridge timeout in milliseconds.
///
/// Bridge calls are specified to complete within 3-5 seconds; anything
/// longer would make the popup feel hung.
pub const MAX_BRIDGE_TIMEOUT_MS: u64 = 5000;

/// Validate a loaded configuration.
pub fn validate_config(config: &PoplineConfig) -> Result<(), ConfigError> {
    validate_dimension("window.width", config.window.width)?;
    validate_dimension("window.height", config.window.height)?;

    if !(MIN_BRIDGE_TIMEOUT_MS..=MAX_BRIDGE_TIMEOUT_MS).contains(&config.bridge.timeout_ms) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "bridge.timeout_ms must be between {} and {}, got {}",
                MIN_BRIDGE_TIMEOUT_MS, MAX_BRIDGE_TIMEOUT_MS, config.bridge.timeout_ms
            ),
        });
    }

    Ok(())
}

fn validate_dimension(field: &str, value: u32) -> Result<(), ConfigError> {
    if !(MIN_WINDOW_DIMENSION..=MAX_WINDOW_DIMENSION).contains(&value) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "{} must be between {} and {}, got {}",
                field, MIN_WINDOW_DIMENSION, MAX_WINDOW_DIMENSION, value
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PoplineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_width_rejected() {
        let mut config = PoplineConfig::default();
        config.window.width = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("window.width"));
    }

    #[test]
    fn test_oversized_height_rejected() {
        let mut config = PoplineConfig::default();
        config.window.height = 10_000;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = PoplineConfig::default();
        config.bridge.timeout_ms = 100;
        assert!(validate_config(&config).is_err());

        config.bridge.timeout_ms = 60_000;
        assert!(validate_config(&config).is_err());

        config.bridge.timeout_ms = 5000;
        assert!(validate_config(&config).is_ok());
    }
}
