//! popline-core: Core library for the Popline quick-capture popup
//!
//! This library implements the focus-aware placement and paste-delivery
//! subsystem: resolving what OS automation is available, placing the popup
//! near the user's focus point, tracking virtual-desktop changes, and
//! delivering captured text back into the previously focused application.
//! It is used by the CLI and by the popup shell.
//!
//! # Main Entry Points
//!
//! - [`delivery`] - The show/submit orchestrator
//! - [`placement`] - Placement strategies and the fallback-chain engine
//! - [`platform`] - Platform capability resolution
//! - [`multiplexer`] - Terminal-multiplexer detection and paste path
//! - [`bridge`] - The out-of-process automation bridge
//! - [`config`] - Configuration management

pub mod bridge;
pub mod clipboard;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod escape;
pub mod logging;
pub mod multiplexer;
pub mod placement;
pub mod platform;
pub mod spaces;

// Re-export commonly used types at crate root for convenience
pub use bridge::{
    ActivationOutcome, ActiveWindowInfo, AppReference, AutomationBridge, BridgeCommand,
    BridgeError, NativeBridge, TextFieldInfo, WindowBounds,
};
pub use config::PoplineConfig;
pub use delivery::{
    DeliveryPath, DeliveryReport, DeliveryStep, PasteOrchestrator, PasteProgress, PopupHost,
    PopupPhase, ShowOutcome,
};
pub use multiplexer::{MultiplexerAdapter, TerminalContext};
pub use placement::{
    Monitor, MonitorProvider, PlacementEngine, PlacementStrategy, PopupSize, Position,
    SystemMonitors,
};
pub use platform::{CapabilityResolver, Platform, PlatformCapabilities, PlatformInfo};
pub use spaces::SpaceSignature;

// Re-export logging initialization
pub use logging::init_logging;
