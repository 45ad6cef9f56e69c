use crate::errors::PoplineError;

/// Failure of the popup lifecycle itself.
///
/// Paste failures are not errors - they surface through the
/// `DeliveryReport`'s progress. Only the popup host can fail a cycle.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Popup host failed: {message}")]
    PopupHostFailed { message: String },
}

impl PoplineError for DeliveryError {
    fn error_code(&self) -> &'static str {
        match self {
            DeliveryError::PopupHostFailed { .. } => "POPUP_HOST_FAILED",
        }
    }
}
