//! Configuration type definitions for Popline.
//!
//! These types are serialized/deserialized from TOML config files.
//!
//! # Example Configuration
//!
//! ```toml
//! [window]
//! position = "active-text-field"
//! width = 600
//! height = 300
//!
//! [bridge]
//! tools_dir = "/usr/local/lib/popline/native-tools"
//! timeout_ms = 3000
//! ```

use crate::placement::types::PlacementStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration loaded from TOML config files.
///
/// This is the primary configuration structure that gets loaded from:
/// 1. User config: `~/.popline/config.toml`
/// 2. Project config: `./.popline/config.toml`
///
/// Project config values override user config values.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PoplineConfig {
    /// Popup window placement and size
    #[serde(default)]
    pub window: WindowConfig,

    /// Native automation bridge settings
    #[serde(default)]
    pub bridge: BridgeConfig,
}

/// Popup window placement and size settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Placement strategy used when showing the popup.
    /// One of: center, active-window-center, active-text-field, cursor.
    #[serde(default = "super::defaults::default_position")]
    pub position: PlacementStrategy,

    /// Popup width in pixels.
    #[serde(default = "super::defaults::default_window_width")]
    pub width: u32,

    /// Popup height in pixels.
    #[serde(default = "super::defaults::default_window_height")]
    pub height: u32,
}

/// Native automation bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory containing the helper executables (window-detector,
    /// keyboard-simulator, text-field-detector). When absent, the tools
    /// are resolved from PATH.
    #[serde(default)]
    pub tools_dir: Option<PathBuf>,

    /// Hard timeout for a single bridge call, in milliseconds.
    #[serde(default = "super::defaults::default_bridge_timeout_ms")]
    pub timeout_ms: u64,
}
