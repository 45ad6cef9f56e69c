use crate::errors::PoplineError;

/// Failure of a native automation bridge call.
///
/// Every bridge failure is normalized into this closed set; callers never
/// see raw subprocess or JSON errors. The bridge itself performs no
/// retries - retry policy belongs to the orchestrator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    #[error("Automation helper unavailable: {message}")]
    Unavailable { message: String },

    #[error("Bridge command '{command}' timed out after {timeout_ms}ms")]
    Timeout { command: String, timeout_ms: u64 },

    #[error("Malformed bridge response: {message}")]
    ParseError { message: String },

    #[error("OS denied automation access: {message}")]
    OsDenied { message: String },

    #[error("Nothing to target: {message}")]
    NotFound { message: String },
}

impl PoplineError for BridgeError {
    fn error_code(&self) -> &'static str {
        match self {
            BridgeError::Unavailable { .. } => "BRIDGE_UNAVAILABLE",
            BridgeError::Timeout { .. } => "BRIDGE_TIMEOUT",
            BridgeError::ParseError { .. } => "BRIDGE_PARSE_ERROR",
            BridgeError::OsDenied { .. } => "BRIDGE_OS_DENIED",
            BridgeError::NotFound { .. } => "BRIDGE_NOT_FOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        // OS denial is actionable by the user (grant accessibility access);
        // everything else is environmental.
        matches!(self, BridgeError::OsDenied { .. })
    }
}
