//! Default implementations for configuration types.
//!
//! This module contains all `Default` implementations and helper functions
//! for providing default values in serde deserialization.

use crate::config::types::{BridgeConfig, WindowConfig};
use crate::placement::types::PlacementStrategy;

/// Returns the default placement strategy.
///
/// `active-text-field` places the popup over the focused text field so the
/// captured text lands visually where it will be pasted.
///
/// Used by serde `#[serde(default = "...")]` attribute.
pub fn default_position() -> PlacementStrategy {
    PlacementStrategy::ActiveTextField
}

/// Returns the default popup width in pixels (600).
pub fn default_window_width() -> u32 {
    600
}

/// Returns the default popup height in pixels (300).
pub fn default_window_height() -> u32 {
    300
}

/// Returns the default bridge call timeout in milliseconds (3000).
///
/// Bridge calls carry a hard timeout so a hung helper process degrades to
/// an ordinary failure instead of stalling the popup.
pub fn default_bridge_timeout_ms() -> u64 {
    3000
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tools_dir: None,
            timeout_ms: default_bridge_timeout_ms(),
        }
    }
}
