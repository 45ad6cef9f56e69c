//! Native automation bridge.
//!
//! A narrow RPC boundary over per-OS helper executables that answer
//! window/text-field bounds, foreground-app identity, activation, and
//! synthetic key injection with a single JSON object on stdout.

pub mod client;
pub mod errors;
pub mod types;

pub use client::NativeBridge;
pub use errors::BridgeError;
pub use types::{
    ActivationOutcome, ActiveWindowInfo, AppReference, BridgeCommand, BridgePayload, BridgeTool,
    ContainerBounds, FocusedElementInfo, TextFieldInfo, WindowBounds,
};

/// Async facade over the bridge commands.
///
/// The placement engine, multiplexer adapter, and orchestrator all talk to
/// this trait, so tests can script bridge responses without spawning
/// helper processes.
#[allow(async_fn_in_trait)]
pub trait AutomationBridge {
    /// Bounds and identity of the foreground window.
    async fn active_window(&self) -> Result<ActiveWindowInfo, BridgeError>;

    /// Identity of the foreground application.
    async fn current_app(&self) -> Result<AppReference, BridgeError>;

    /// Bounds of the focused text field, if any.
    async fn focused_text_field(&self) -> Result<TextFieldInfo, BridgeError>;

    /// Info about the focused accessibility element.
    async fn focused_element(&self) -> Result<FocusedElementInfo, BridgeError>;

    /// Inject the standard paste key chord into the foreground app.
    async fn inject_paste(&self) -> Result<ActivationOutcome, BridgeError>;

    /// Inject the multiplexer paste key chord.
    async fn inject_multiplexer_paste(&self) -> Result<ActivationOutcome, BridgeError>;

    /// Bring a process to the foreground by name.
    async fn activate_by_name(&self, process_name: &str) -> Result<ActivationOutcome, BridgeError>;

    /// Bring a process to the foreground by stable bundle identifier.
    async fn activate_by_id(&self, bundle_id: &str) -> Result<ActivationOutcome, BridgeError>;

    /// Activate a process, wait for focus to settle, then inject the paste
    /// chord matching the target (multiplexer targets get the multiplexer
    /// chord and a longer settle).
    async fn activate_and_paste(&self, process_name: &str)
    -> Result<ActivationOutcome, BridgeError>;
}
