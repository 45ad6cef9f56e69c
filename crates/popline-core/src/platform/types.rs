use serde::{Deserialize, Serialize};

use crate::multiplexer::types::TerminalContext;

/// OS family the process is running on.
///
/// The guest layer (Linux-compatible environment hosted inside Windows)
/// reports itself as `Linux`; the multiplexer adapter tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::MacOs => "macOS",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// Whether this OS family can be running inside (or hosting) the
    /// terminal-multiplexer guest layer, making detection worthwhile.
    pub fn probes_multiplexer(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::MacOs => write!(f, "macos"),
            Platform::Windows => write!(f, "windows"),
            Platform::Linux => write!(f, "linux"),
        }
    }
}

/// Fixed set of automation feature flags for an environment snapshot.
///
/// Immutable once computed; the resolver replaces the whole value on
/// cache refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformCapabilities {
    pub native_window_detection: bool,
    pub native_keystroke_injection: bool,
    pub native_text_field_detection: bool,
    pub clipboard_integration: bool,
    pub app_activation: bool,
    pub requires_special_terminal_handling: bool,
}

/// Resolved platform snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformInfo {
    pub platform: Platform,
    pub platform_name: String,
    pub capabilities: PlatformCapabilities,
    pub terminal_context: Option<TerminalContext>,
    /// Human-readable label for a detected special environment,
    /// e.g. `Wezterm+WSL(Ubuntu)`.
    pub special_environment: Option<String>,
    pub resolved_at: chrono::DateTime<chrono::Utc>,
}
