//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.popline/config.toml` (global user preferences)
//! 3. **Project config** - `./.popline/config.toml` (project-specific overrides)

use crate::config::types::{BridgeConfig, PoplineConfig, WindowConfig};
use crate::config::validation::validate_config;
use std::fs;
use std::path::PathBuf;

/// Check if an error is a "file not found" error.
fn is_file_not_found(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
        return io_err.kind() == std::io::ErrorKind::NotFound;
    }

    let err_str = e.to_string();
    err_str.contains("No such file or directory") || err_str.contains("cannot find the path")
}

/// Load configuration from the hierarchy of config files.
///
/// Missing config files are not errors; parse and validation failures are.
pub fn load_hierarchy() -> Result<PoplineConfig, Box<dyn std::error::Error>> {
    let mut config = PoplineConfig::default();

    // Load user config (file not found is expected, parse errors fail)
    match load_user_config() {
        Ok(user_config) => config = merge_configs(config, user_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with defaults
    }

    // Load project config (file not found is expected, parse errors fail)
    match load_project_config() {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(e) if !is_file_not_found(e.as_ref()) => return Err(e),
        Err(_) => {} // File not found - continue with merged config
    }

    validate_config(&config)?;

    Ok(config)
}

/// Load the user configuration from ~/.popline/config.toml.
fn load_user_config() -> Result<PoplineConfig, Box<dyn std::error::Error>> {
    let home_dir = dirs::home_dir().ok_or("Could not find home directory")?;
    let config_path = home_dir.join(".popline").join("config.toml");
    load_config_file(&config_path)
}

/// Load the project configuration from ./.popline/config.toml.
fn load_project_config() -> Result<PoplineConfig, Box<dyn std::error::Error>> {
    let config_path = std::env::current_dir()?.join(".popline").join("config.toml");
    load_config_file(&config_path)
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &PathBuf) -> Result<PoplineConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
    let config: PoplineConfig = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
    Ok(config)
}

/// Merge two configurations, with override_config taking precedence.
///
/// Scalar window/bridge fields always take the override value (we cannot
/// distinguish an explicit default from an omitted field after serde
/// fills defaults in); optional fields fall back to the base value.
pub fn merge_configs(base: PoplineConfig, override_config: PoplineConfig) -> PoplineConfig {
    PoplineConfig {
        window: WindowConfig {
            position: override_config.window.position,
            width: override_config.window.width,
            height: override_config.window.height,
        },
        bridge: BridgeConfig {
            tools_dir: override_config.bridge.tools_dir.or(base.bridge.tools_dir),
            timeout_ms: override_config.bridge.timeout_ms,
        },
    }
}
