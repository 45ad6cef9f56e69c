//! Bridge command and payload types.
//!
//! The wire format is a single JSON object on stdout per call, camelCase
//! field names, with failures encoded as a flat `{"error": "..."}` object.

use serde::{Deserialize, Serialize};

use crate::bridge::errors::BridgeError;

/// The three helper executables behind the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeTool {
    WindowDetector,
    KeyboardSimulator,
    TextFieldDetector,
}

impl BridgeTool {
    pub fn base_name(&self) -> &'static str {
        match self {
            BridgeTool::WindowDetector => "window-detector",
            BridgeTool::KeyboardSimulator => "keyboard-simulator",
            BridgeTool::TextFieldDetector => "text-field-detector",
        }
    }

    /// Platform executable name (`.exe` suffix on Windows).
    pub fn executable_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.base_name())
        } else {
            self.base_name().to_string()
        }
    }
}

/// A single bridge invocation.
///
/// Activation and injection commands cause OS-level focus changes and
/// synthetic input; the query commands are read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    /// Bounds and identity of the foreground window.
    WindowBounds,
    /// Identity of the foreground application.
    CurrentApp,
    /// Bounds of the focused text field, if any.
    TextFieldBounds,
    /// Info about the focused accessibility element.
    FocusedElement,
    /// Inject the standard paste key chord.
    Paste,
    /// Inject the multiplexer paste key chord (multiplexers reserve the
    /// standard chord for their own copy mode).
    MultiplexerPaste,
    /// Bring a process to the foreground by process name.
    ActivateByName { process_name: String },
    /// Bring a process to the foreground by stable bundle identifier.
    ActivateById { bundle_id: String },
    /// Activate a process and inject the matching paste chord. The helper
    /// picks the chord and pre-paste delay by matching the name against
    /// the known multiplexer identifier.
    ActivateAndPasteByName { process_name: String },
}

impl BridgeCommand {
    /// The wire-level subcommand name.
    pub fn wire_name(&self) -> &'static str {
        match self {
            BridgeCommand::WindowBounds => "window-bounds",
            BridgeCommand::CurrentApp => "current-app",
            BridgeCommand::TextFieldBounds => "text-field-bounds",
            BridgeCommand::FocusedElement => "focused-element",
            BridgeCommand::Paste => "paste",
            BridgeCommand::MultiplexerPaste => "paste-wezterm",
            BridgeCommand::ActivateByName { .. } => "activate-name",
            BridgeCommand::ActivateById { .. } => "activate-bundle",
            BridgeCommand::ActivateAndPasteByName { .. } => "activate-and-paste-name",
        }
    }

    /// The helper executable that serves this command.
    pub fn tool(&self) -> BridgeTool {
        match self {
            BridgeCommand::WindowBounds | BridgeCommand::CurrentApp => BridgeTool::WindowDetector,
            BridgeCommand::TextFieldBounds | BridgeCommand::FocusedElement => {
                BridgeTool::TextFieldDetector
            }
            BridgeCommand::Paste
            | BridgeCommand::MultiplexerPaste
            | BridgeCommand::ActivateByName { .. }
            | BridgeCommand::ActivateById { .. }
            | BridgeCommand::ActivateAndPasteByName { .. } => BridgeTool::KeyboardSimulator,
        }
    }

    /// Full argument vector passed to the helper executable.
    pub fn args(&self) -> Vec<String> {
        match self {
            BridgeCommand::ActivateByName { process_name }
            | BridgeCommand::ActivateAndPasteByName { process_name } => {
                vec![self.wire_name().to_string(), process_name.clone()]
            }
            BridgeCommand::ActivateById { bundle_id } => {
                vec![self.wire_name().to_string(), bundle_id.clone()]
            }
            _ => vec![self.wire_name().to_string()],
        }
    }
}

/// Screen-coordinate rectangle. Width and height are validated positive
/// at construction; a zero-area rectangle from a helper is a parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowBounds {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Result<Self, BridgeError> {
        if width <= 0 || height <= 0 {
            return Err(BridgeError::ParseError {
                message: format!("non-positive bounds from helper: {}x{}", width, height),
            });
        }
        Ok(Self {
            x,
            y,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Foreground window identity and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveWindowInfo {
    pub bounds: WindowBounds,
    pub app_name: String,
    pub executable_path: Option<String>,
    pub window_title: Option<String>,
}

/// The application that had focus before the popup appeared.
///
/// Captured once per show-cycle by the orchestrator and held immutable
/// until the next cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppReference {
    pub name: String,
    pub process_id: Option<u32>,
    pub bundle_id: Option<String>,
    pub executable_path: Option<String>,
}

/// Focused text field bounds with optional visible parent container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextFieldInfo {
    pub bounds: WindowBounds,
    pub role: Option<String>,
    pub app_name: Option<String>,
    pub app_pid: Option<u32>,
    pub title: Option<String>,
    pub enabled: bool,
    pub has_content: bool,
    pub parent: Option<ContainerBounds>,
}

impl TextFieldInfo {
    /// Bounds to place against: the parent container when the helper marks
    /// it as the visible container (scrollable fields report a small inner
    /// rect), otherwise the raw field bounds.
    pub fn effective_bounds(&self) -> WindowBounds {
        match &self.parent {
            Some(parent) if parent.is_visible_container => parent.bounds,
            _ => self.bounds,
        }
    }
}

/// Parent container of a focused text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerBounds {
    pub bounds: WindowBounds,
    pub is_visible_container: bool,
}

/// Focused accessibility element description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusedElementInfo {
    pub app_name: Option<String>,
    pub app_pid: Option<u32>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub enabled: bool,
}

/// Acknowledgement from an activation or injection command.
///
/// `success: false` is not an error - the helper ran but the OS call did
/// not take effect. Callers inspect the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationOutcome {
    pub success: bool,
    pub command: Option<String>,
}

/// Successful bridge payload, one variant per command family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgePayload {
    ActiveWindow(ActiveWindowInfo),
    CurrentApp(AppReference),
    TextField(TextFieldInfo),
    FocusedElement(FocusedElementInfo),
    Ack(ActivationOutcome),
}

// Wire-format structs. The helpers emit camelCase JSON.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawActiveWindow {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub app_name: String,
    pub executable_path: Option<String>,
    pub window_title: Option<String>,
}

impl TryFrom<RawActiveWindow> for ActiveWindowInfo {
    type Error = BridgeError;

    fn try_from(raw: RawActiveWindow) -> Result<Self, Self::Error> {
        Ok(Self {
            bounds: WindowBounds::new(raw.x, raw.y, raw.width, raw.height)?,
            app_name: raw.app_name,
            executable_path: raw.executable_path,
            window_title: raw.window_title,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCurrentApp {
    pub name: String,
    pub process_id: Option<u32>,
    pub bundle_id: Option<String>,
    pub executable_path: Option<String>,
}

impl From<RawCurrentApp> for AppReference {
    fn from(raw: RawCurrentApp) -> Self {
        Self {
            name: raw.name,
            process_id: raw.process_id,
            bundle_id: raw.bundle_id,
            executable_path: raw.executable_path,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTextField {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub role: Option<String>,
    pub app_name: Option<String>,
    pub app_pid: Option<u32>,
    pub title: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub has_content: bool,
    pub parent: Option<RawContainer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawContainer {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub is_visible_container: bool,
}

impl TryFrom<RawTextField> for TextFieldInfo {
    type Error = BridgeError;

    fn try_from(raw: RawTextField) -> Result<Self, Self::Error> {
        // A malformed parent is dropped rather than failing the whole
        // response - the raw field bounds are still usable.
        let parent = raw.parent.and_then(|p| {
            WindowBounds::new(p.x, p.y, p.width, p.height)
                .ok()
                .map(|bounds| ContainerBounds {
                    bounds,
                    is_visible_container: p.is_visible_container,
                })
        });
        Ok(Self {
            bounds: WindowBounds::new(raw.x, raw.y, raw.width, raw.height)?,
            role: raw.role,
            app_name: raw.app_name,
            app_pid: raw.app_pid,
            title: raw.title,
            enabled: raw.enabled,
            has_content: raw.has_content,
            parent,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawFocusedElement {
    pub app_name: Option<String>,
    pub app_pid: Option<u32>,
    pub role: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub enabled: bool,
}

impl From<RawFocusedElement> for FocusedElementInfo {
    fn from(raw: RawFocusedElement) -> Self {
        Self {
            app_name: raw.app_name,
            app_pid: raw.app_pid,
            role: raw.role,
            title: raw.title,
            description: raw.description,
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            enabled: raw.enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAck {
    pub success: bool,
    pub command: Option<String>,
}

impl From<RawAck> for ActivationOutcome {
    fn from(raw: RawAck) -> Self {
        Self {
            success: raw.success,
            command: raw.command,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds_rejects_non_positive() {
        assert!(WindowBounds::new(0, 0, 0, 100).is_err());
        assert!(WindowBounds::new(0, 0, 100, -5).is_err());
        assert!(WindowBounds::new(-10, -10, 100, 100).is_ok());
    }

    #[test]
    fn test_command_routing() {
        assert_eq!(BridgeCommand::WindowBounds.tool(), BridgeTool::WindowDetector);
        assert_eq!(
            BridgeCommand::TextFieldBounds.tool(),
            BridgeTool::TextFieldDetector
        );
        assert_eq!(
            BridgeCommand::MultiplexerPaste.tool(),
            BridgeTool::KeyboardSimulator
        );
    }

    #[test]
    fn test_command_args() {
        assert_eq!(BridgeCommand::Paste.args(), vec!["paste"]);
        assert_eq!(
            BridgeCommand::ActivateByName {
                process_name: "wezterm-gui".to_string()
            }
            .args(),
            vec!["activate-name", "wezterm-gui"]
        );
        assert_eq!(
            BridgeCommand::ActivateById {
                bundle_id: "com.apple.Terminal".to_string()
            }
            .args(),
            vec!["activate-bundle", "com.apple.Terminal"]
        );
    }

    #[test]
    fn test_multiplexer_paste_wire_name() {
        assert_eq!(BridgeCommand::MultiplexerPaste.wire_name(), "paste-wezterm");
    }

    #[test]
    fn test_effective_bounds_prefers_visible_container() {
        let field = TextFieldInfo {
            bounds: WindowBounds::new(100, 100, 300, 40).unwrap(),
            role: Some("AXTextArea".to_string()),
            app_name: None,
            app_pid: None,
            title: None,
            enabled: true,
            has_content: false,
            parent: Some(ContainerBounds {
                bounds: WindowBounds::new(80, 60, 500, 400).unwrap(),
                is_visible_container: true,
            }),
        };
        assert_eq!(field.effective_bounds().width, 500);

        let field_plain = TextFieldInfo {
            parent: Some(ContainerBounds {
                bounds: WindowBounds::new(80, 60, 500, 400).unwrap(),
                is_visible_container: false,
            }),
            ..field
        };
        assert_eq!(field_plain.effective_bounds().width, 300);
    }
}
