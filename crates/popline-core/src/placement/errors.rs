use crate::bridge::BridgeError;
use crate::errors::PoplineError;
use crate::placement::types::PlacementStrategy;

/// Failure of a single placement strategy attempt.
///
/// Never surfaced to the end user: the engine degrades down the strategy's
/// fallback chain and logs at low severity.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("Strategy '{strategy}' is not supported in this environment")]
    StrategyUnsupported { strategy: PlacementStrategy },

    #[error("Bridge query failed: {source}")]
    Bridge {
        #[from]
        source: BridgeError,
    },

    #[error("Monitor information unavailable: {message}")]
    MonitorUnavailable { message: String },

    #[error("Cursor position unavailable: {message}")]
    CursorUnavailable { message: String },
}

impl PoplineError for PlacementError {
    fn error_code(&self) -> &'static str {
        match self {
            PlacementError::StrategyUnsupported { .. } => "PLACEMENT_STRATEGY_UNSUPPORTED",
            PlacementError::Bridge { .. } => "PLACEMENT_BRIDGE_FAILED",
            PlacementError::MonitorUnavailable { .. } => "PLACEMENT_MONITOR_UNAVAILABLE",
            PlacementError::CursorUnavailable { .. } => "PLACEMENT_CURSOR_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_display() {
        let error = PlacementError::StrategyUnsupported {
            strategy: PlacementStrategy::ActiveTextField,
        };
        assert_eq!(
            error.to_string(),
            "Strategy 'active-text-field' is not supported in this environment"
        );
        assert_eq!(error.error_code(), "PLACEMENT_STRATEGY_UNSUPPORTED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_bridge_error_wraps() {
        let error: PlacementError = BridgeError::Timeout {
            command: "window-bounds".to_string(),
            timeout_ms: 3000,
        }
        .into();
        assert_eq!(error.error_code(), "PLACEMENT_BRIDGE_FAILED");
    }
}
