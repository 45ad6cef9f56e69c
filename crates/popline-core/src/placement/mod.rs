//! Popup placement: strategies, monitors, and the fallback-chain engine.

pub mod engine;
pub mod errors;
pub mod monitors;
pub mod types;

pub use engine::{CENTER_VERTICAL_BIAS_PX, PlacementEngine};
pub use errors::PlacementError;
pub use monitors::{MonitorProvider, SystemMonitors};
pub use types::{Monitor, PlacementStrategy, Point, PopupSize, Position};
