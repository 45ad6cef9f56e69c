use serde::Serialize;

use crate::bridge::AppReference;
use crate::delivery::errors::DeliveryError;
use crate::placement::types::{PopupSize, Position};
use crate::spaces::SpaceSignature;

/// Popup lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PopupPhase {
    Idle,
    Resolving,
    Visible,
    Delivering,
}

/// Which delivery path handled a submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryPath {
    /// Clipboard + focus restore + standard paste chord.
    Standard,
    /// Multiplexer path: host clipboard + focus restore + multiplexer chord.
    Multiplexer,
}

impl std::fmt::Display for DeliveryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryPath::Standard => write!(f, "standard"),
            DeliveryPath::Multiplexer => write!(f, "multiplexer"),
        }
    }
}

/// A step of the best-effort delivery pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DeliveryStep {
    ClipboardSet,
    FocusRestored,
    KeystrokeInjected,
}

impl std::fmt::Display for DeliveryStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryStep::ClipboardSet => write!(f, "clipboard-set"),
            DeliveryStep::FocusRestored => write!(f, "focus-restored"),
            DeliveryStep::KeystrokeInjected => write!(f, "keystroke-injected"),
        }
    }
}

/// Outcome of the delivery pipeline: which steps succeeded.
///
/// The clipboard step is the success floor - a set clipboard with a failed
/// key injection is still a partial success from the user's perspective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PasteProgress {
    pub clipboard_set: bool,
    pub focus_restored: bool,
    pub keystroke_injected: bool,
}

impl PasteProgress {
    /// The furthest pipeline step that succeeded.
    pub fn furthest(&self) -> Option<DeliveryStep> {
        if self.keystroke_injected {
            Some(DeliveryStep::KeystrokeInjected)
        } else if self.focus_restored {
            Some(DeliveryStep::FocusRestored)
        } else if self.clipboard_set {
            Some(DeliveryStep::ClipboardSet)
        } else {
            None
        }
    }

    /// Whether delivery counts as (at least partially) successful.
    pub fn delivered(&self) -> bool {
        self.clipboard_set
    }
}

/// Result of a submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub path: DeliveryPath,
    pub progress: PasteProgress,
}

impl DeliveryReport {
    pub fn delivered(&self) -> bool {
        self.progress.delivered()
    }
}

/// Result of a show cycle.
#[derive(Debug, Clone)]
pub struct ShowOutcome {
    /// Whether the existing popup window was reused (false means it was
    /// created, or destroyed and recreated after a space change).
    pub reused_window: bool,
    /// Freshly computed position, when placement ran this cycle.
    pub position: Option<Position>,
    /// The app that held focus before the popup appeared.
    pub previous_app: Option<AppReference>,
    /// Space signature captured for this cycle.
    pub space_signature: Option<SpaceSignature>,
}

/// The popup window as seen by the orchestrator.
///
/// The embedding shell implements this; the core decides when to create,
/// destroy, position, and show, but never renders.
pub trait PopupHost {
    /// Whether a window handle currently exists.
    fn exists(&self) -> bool;

    /// Whether the window is currently visible.
    fn is_visible(&self) -> bool;

    /// Create the popup window (hidden) at the given size.
    fn create(&mut self, size: PopupSize) -> Result<(), DeliveryError>;

    /// Destroy the popup window.
    fn destroy(&mut self);

    /// Move the popup window.
    fn set_position(&mut self, position: Position);

    /// Show and focus the popup window.
    fn show(&mut self);

    /// Hide the popup window, keeping it for reuse.
    fn hide(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_furthest_ordering() {
        let none = PasteProgress::default();
        assert_eq!(none.furthest(), None);
        assert!(!none.delivered());

        let clipboard_only = PasteProgress {
            clipboard_set: true,
            ..Default::default()
        };
        assert_eq!(clipboard_only.furthest(), Some(DeliveryStep::ClipboardSet));
        assert!(clipboard_only.delivered());

        let injected = PasteProgress {
            clipboard_set: true,
            focus_restored: false,
            keystroke_injected: true,
        };
        assert_eq!(injected.furthest(), Some(DeliveryStep::KeystrokeInjected));
    }

    #[test]
    fn test_step_ordering() {
        assert!(DeliveryStep::ClipboardSet < DeliveryStep::FocusRestored);
        assert!(DeliveryStep::FocusRestored < DeliveryStep::KeystrokeInjected);
    }

    #[test]
    fn test_report_delivered_follows_clipboard() {
        let report = DeliveryReport {
            path: DeliveryPath::Multiplexer,
            progress: PasteProgress {
                clipboard_set: true,
                focus_restored: false,
                keystroke_injected: false,
            },
        };
        assert!(report.delivered());
    }
}
