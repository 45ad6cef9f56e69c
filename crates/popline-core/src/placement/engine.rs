//! Placement strategy evaluation with ordered fallback chains.

use tracing::{debug, warn};

use crate::bridge::AutomationBridge;
use crate::placement::errors::PlacementError;
use crate::placement::monitors::MonitorProvider;
use crate::placement::types::{PlacementStrategy, Point, PopupSize, Position};
use crate::platform::types::{Platform, PlatformCapabilities};

/// Upward bias applied to the Center strategy so the popup sits slightly
/// above true center and does not obscure the typed-at location.
pub const CENTER_VERTICAL_BIAS_PX: i32 = -100;

/// Computes popup screen coordinates for a placement strategy.
///
/// Every strategy attempt either yields a position clamped into exactly
/// one monitor, or fails and advances the strategy's fallback chain. No
/// placement failure is ever surfaced to the end user; the popup simply
/// appears somewhere reasonable.
pub struct PlacementEngine<'a, B, M> {
    bridge: &'a B,
    monitors: &'a M,
    platform: Platform,
    capabilities: PlatformCapabilities,
}

impl<'a, B: AutomationBridge, M: MonitorProvider> PlacementEngine<'a, B, M> {
    pub fn new(
        bridge: &'a B,
        monitors: &'a M,
        platform: Platform,
        capabilities: PlatformCapabilities,
    ) -> Self {
        Self {
            bridge,
            monitors,
            platform,
            capabilities,
        }
    }

    /// Ordered fallback chain for a strategy. The first entry is the
    /// strategy itself; every chain ends in `Center`.
    pub fn fallback_chain(strategy: PlacementStrategy) -> &'static [PlacementStrategy] {
        match strategy {
            PlacementStrategy::Center => &[PlacementStrategy::Center],
            PlacementStrategy::ActiveWindowCenter => {
                &[PlacementStrategy::ActiveWindowCenter, PlacementStrategy::Center]
            }
            PlacementStrategy::ActiveTextField => &[
                PlacementStrategy::ActiveTextField,
                PlacementStrategy::ActiveWindowCenter,
                PlacementStrategy::Center,
            ],
            PlacementStrategy::Cursor => &[PlacementStrategy::Cursor, PlacementStrategy::Center],
        }
    }

    /// Compute the popup position for a strategy, degrading through the
    /// fallback chain on failure.
    pub async fn compute_position(
        &self,
        strategy: PlacementStrategy,
        size: PopupSize,
    ) -> Result<Position, PlacementError> {
        let chain = Self::fallback_chain(strategy);
        let mut last_error = None;

        for (attempt, candidate) in chain.iter().enumerate() {
            match self.try_strategy(*candidate, size).await {
                Ok(position) => {
                    if attempt > 0 {
                        debug!(
                            event = "core.placement.fallback_used",
                            requested = %strategy,
                            used = %candidate,
                            x = position.x,
                            y = position.y
                        );
                    }
                    return Ok(position);
                }
                Err(e) => {
                    debug!(
                        event = "core.placement.strategy_failed",
                        strategy = %candidate,
                        error = %e
                    );
                    last_error = Some(e);
                }
            }
        }

        // Only reachable when even Center failed (no monitor information).
        let error = last_error.expect("fallback chain is never empty");
        warn!(
            event = "core.placement.chain_exhausted",
            strategy = %strategy,
            error = %error
        );
        Err(error)
    }

    async fn try_strategy(
        &self,
        strategy: PlacementStrategy,
        size: PopupSize,
    ) -> Result<Position, PlacementError> {
        match strategy {
            PlacementStrategy::Center => self.center(size),
            PlacementStrategy::ActiveWindowCenter => self.active_window_center(size).await,
            PlacementStrategy::ActiveTextField => self.active_text_field(size).await,
            PlacementStrategy::Cursor => self.cursor(size),
        }
    }

    /// Center of the primary monitor with the upward vertical bias.
    fn center(&self, size: PopupSize) -> Result<Position, PlacementError> {
        let monitor = self.monitors.primary()?;

        // In the guest-layer environment the popup sits in the upper third
        // of the screen instead of the fixed bias.
        let bias = if self.platform == Platform::Linux {
            -(monitor.height as i32 / 6)
        } else {
            CENTER_VERTICAL_BIAS_PX
        };

        let position = Position {
            x: monitor.x + (monitor.width as i32 - size.width as i32) / 2,
            y: monitor.y + (monitor.height as i32 - size.height as i32) / 2 + bias,
        };

        self.constrain_to_monitor(position, size, monitor.center())
    }

    /// Center within the foreground window's bounds.
    async fn active_window_center(&self, size: PopupSize) -> Result<Position, PlacementError> {
        if !self.capabilities.native_window_detection {
            return Err(PlacementError::StrategyUnsupported {
                strategy: PlacementStrategy::ActiveWindowCenter,
            });
        }

        let window = self.bridge.active_window().await?;
        let bounds = window.bounds;

        let position = Position {
            x: bounds.x + (bounds.width as i32 - size.width as i32) / 2,
            y: bounds.y + (bounds.height as i32 - size.height as i32) / 2,
        };
        let reference = Point {
            x: bounds.x + bounds.width as i32 / 2,
            y: bounds.y + bounds.height as i32 / 2,
        };

        self.constrain_to_monitor(position, size, reference)
    }

    /// Align to the focused text field: left-aligned when the field is
    /// narrower than the popup, centered otherwise; vertically centered.
    async fn active_text_field(&self, size: PopupSize) -> Result<Position, PlacementError> {
        if !self.capabilities.native_text_field_detection {
            return Err(PlacementError::StrategyUnsupported {
                strategy: PlacementStrategy::ActiveTextField,
            });
        }

        let field = self.bridge.focused_text_field().await?;
        let bounds = field.effective_bounds();

        let x = if bounds.width < size.width {
            bounds.x
        } else {
            bounds.x + (bounds.width as i32 - size.width as i32) / 2
        };
        let y = bounds.y + (bounds.height as i32 - size.height as i32) / 2;

        let reference = Point {
            x: bounds.x + bounds.width as i32 / 2,
            y: bounds.y + bounds.height as i32 / 2,
        };

        self.constrain_to_monitor(Position { x, y }, size, reference)
    }

    /// Center on the current pointer position.
    fn cursor(&self, size: PopupSize) -> Result<Position, PlacementError> {
        let point = self.monitors.cursor_position()?;
        let position = Position {
            x: point.x - size.width as i32 / 2,
            y: point.y - size.height as i32 / 2,
        };
        self.constrain_to_monitor(position, size, point)
    }

    /// The single shared clamp: pick the monitor containing (or nearest
    /// to) the reference point and clamp the full popup rectangle into it.
    pub fn constrain_to_monitor(
        &self,
        position: Position,
        size: PopupSize,
        reference: Point,
    ) -> Result<Position, PlacementError> {
        let monitor = self.monitors.nearest(reference)?;
        Ok(monitor.clamp(position, size))
    }
}
