//! Paste delivery orchestration: the show/submit cycle over the bridge,
//! resolver, space tracker, and placement engine.

pub mod errors;
pub mod orchestrator;
pub mod types;

pub use errors::DeliveryError;
pub use orchestrator::PasteOrchestrator;
pub use types::{
    DeliveryPath, DeliveryReport, DeliveryStep, PasteProgress, PopupHost, PopupPhase, ShowOutcome,
};
