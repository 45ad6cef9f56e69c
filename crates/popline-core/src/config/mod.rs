//! # Configuration System
//!
//! Hierarchical TOML configuration for Popline.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.popline/config.toml` (global user preferences)
//! 3. **Project config** - `./.popline/config.toml` (project-specific overrides)
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use popline_core::config::PoplineConfig;
//!
//! // Handle config errors explicitly - don't silently fall back to defaults
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PoplineConfig::load_hierarchy()?;
//!     let _strategy = config.window.position;
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

// Public API exports
pub use types::{BridgeConfig, PoplineConfig, WindowConfig};
pub use validation::validate_config;

impl PoplineConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, Box<dyn std::error::Error>> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
