//! Subprocess bridge client.
//!
//! Helper tools are invoked out-of-process and answer with a single JSON
//! object on stdout. All quoting/escaping concerns stay inside this module
//! and the helpers themselves; no caller ever builds a shell string.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::bridge::AutomationBridge;
use crate::bridge::errors::BridgeError;
use crate::bridge::types::{
    ActivationOutcome, ActiveWindowInfo, AppReference, BridgeCommand, BridgePayload, BridgeTool,
    FocusedElementInfo, RawAck, RawActiveWindow, RawCurrentApp, RawFocusedElement, RawTextField,
    TextFieldInfo,
};
use crate::config::BridgeConfig;

/// Out-of-process automation bridge.
///
/// Pure request/response: no state beyond tool resolution and the call
/// timeout. Retry policy belongs to the orchestrator.
#[derive(Debug, Clone)]
pub struct NativeBridge {
    tools_dir: Option<PathBuf>,
    timeout: Duration,
}

impl NativeBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            tools_dir: config.tools_dir.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Resolve a helper executable: configured tools directory first,
    /// then PATH.
    fn resolve_tool(&self, tool: BridgeTool) -> Result<PathBuf, BridgeError> {
        let executable = tool.executable_name();

        if let Some(dir) = &self.tools_dir {
            let candidate = dir.join(&executable);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        which::which(&executable).map_err(|_| BridgeError::Unavailable {
            message: format!("automation helper '{}' not found", executable),
        })
    }

    /// Run a bridge command and parse its payload.
    pub async fn query(&self, command: &BridgeCommand) -> Result<BridgePayload, BridgeError> {
        let tool_path = self.resolve_tool(command.tool())?;

        debug!(
            event = "core.bridge.query_started",
            command = command.wire_name(),
            tool = %tool_path.display()
        );

        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&tool_path)
                .args(command.args())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| {
            warn!(
                event = "core.bridge.query_timeout",
                command = command.wire_name(),
                timeout_ms = self.timeout.as_millis() as u64
            );
            BridgeError::Timeout {
                command: command.wire_name().to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        })?
        .map_err(|e| BridgeError::Unavailable {
            message: format!("failed to spawn '{}': {}", tool_path.display(), e),
        })?;

        // Exit code 1 with JSON on stdout is a helper-reported outcome
        // (e.g. an injection that did not take); only an empty stdout is a
        // wrapper-level failure.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::Unavailable {
                message: format!(
                    "'{}' produced no output (exit code: {:?})",
                    command.wire_name(),
                    output.status.code()
                ),
            });
        }

        let payload = parse_payload(command, trimmed)?;

        debug!(
            event = "core.bridge.query_completed",
            command = command.wire_name()
        );

        Ok(payload)
    }
}

/// Parse a helper's stdout into a typed payload.
///
/// Any JSON object carrying an `error` key is a failure regardless of the
/// other fields it carries.
pub(crate) fn parse_payload(
    command: &BridgeCommand,
    raw: &str,
) -> Result<BridgePayload, BridgeError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| BridgeError::ParseError {
            message: format!("invalid JSON from '{}': {}", command.wire_name(), e),
        })?;

    if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
        return Err(classify_error(error));
    }

    let parse_err = |e: serde_json::Error| BridgeError::ParseError {
        message: format!("unexpected payload for '{}': {}", command.wire_name(), e),
    };

    match command {
        BridgeCommand::WindowBounds => {
            let raw: RawActiveWindow = serde_json::from_value(value).map_err(parse_err)?;
            Ok(BridgePayload::ActiveWindow(ActiveWindowInfo::try_from(
                raw,
            )?))
        }
        BridgeCommand::CurrentApp => {
            let raw: RawCurrentApp = serde_json::from_value(value).map_err(parse_err)?;
            Ok(BridgePayload::CurrentApp(AppReference::from(raw)))
        }
        BridgeCommand::TextFieldBounds => {
            let raw: RawTextField = serde_json::from_value(value).map_err(parse_err)?;
            Ok(BridgePayload::TextField(TextFieldInfo::try_from(raw)?))
        }
        BridgeCommand::FocusedElement => {
            let raw: RawFocusedElement = serde_json::from_value(value).map_err(parse_err)?;
            Ok(BridgePayload::FocusedElement(FocusedElementInfo::from(raw)))
        }
        BridgeCommand::Paste
        | BridgeCommand::MultiplexerPaste
        | BridgeCommand::ActivateByName { .. }
        | BridgeCommand::ActivateById { .. }
        | BridgeCommand::ActivateAndPasteByName { .. } => {
            let raw: RawAck = serde_json::from_value(value).map_err(parse_err)?;
            Ok(BridgePayload::Ack(ActivationOutcome::from(raw)))
        }
    }
}

/// Map a helper error string onto the closed failure taxonomy.
fn classify_error(error: &str) -> BridgeError {
    let lowered = error.to_lowercase();
    if lowered.contains("no_focused_element")
        || lowered.contains("not_text_field")
        || lowered.contains("element_not_available")
        || lowered.contains("no active")
        || lowered.contains("not found")
    {
        BridgeError::NotFound {
            message: error.to_string(),
        }
    } else if lowered.contains("denied")
        || lowered.contains("permission")
        || lowered.contains("not allowed")
        || lowered.contains("accessibility")
    {
        BridgeError::OsDenied {
            message: error.to_string(),
        }
    } else {
        BridgeError::Unavailable {
            message: error.to_string(),
        }
    }
}

impl AutomationBridge for NativeBridge {
    async fn active_window(&self) -> Result<ActiveWindowInfo, BridgeError> {
        match self.query(&BridgeCommand::WindowBounds).await? {
            BridgePayload::ActiveWindow(info) => Ok(info),
            other => Err(unexpected_payload("window-bounds", &other)),
        }
    }

    async fn current_app(&self) -> Result<AppReference, BridgeError> {
        match self.query(&BridgeCommand::CurrentApp).await? {
            BridgePayload::CurrentApp(app) => Ok(app),
            other => Err(unexpected_payload("current-app", &other)),
        }
    }

    async fn focused_text_field(&self) -> Result<TextFieldInfo, BridgeError> {
        match self.query(&BridgeCommand::TextFieldBounds).await? {
            BridgePayload::TextField(field) => Ok(field),
            other => Err(unexpected_payload("text-field-bounds", &other)),
        }
    }

    async fn focused_element(&self) -> Result<FocusedElementInfo, BridgeError> {
        match self.query(&BridgeCommand::FocusedElement).await? {
            BridgePayload::FocusedElement(element) => Ok(element),
            other => Err(unexpected_payload("focused-element", &other)),
        }
    }

    async fn inject_paste(&self) -> Result<ActivationOutcome, BridgeError> {
        self.expect_ack(BridgeCommand::Paste).await
    }

    async fn inject_multiplexer_paste(&self) -> Result<ActivationOutcome, BridgeError> {
        self.expect_ack(BridgeCommand::MultiplexerPaste).await
    }

    async fn activate_by_name(&self, process_name: &str) -> Result<ActivationOutcome, BridgeError> {
        self.expect_ack(BridgeCommand::ActivateByName {
            process_name: process_name.to_string(),
        })
        .await
    }

    async fn activate_by_id(&self, bundle_id: &str) -> Result<ActivationOutcome, BridgeError> {
        self.expect_ack(BridgeCommand::ActivateById {
            bundle_id: bundle_id.to_string(),
        })
        .await
    }

    async fn activate_and_paste(
        &self,
        process_name: &str,
    ) -> Result<ActivationOutcome, BridgeError> {
        self.expect_ack(BridgeCommand::ActivateAndPasteByName {
            process_name: process_name.to_string(),
        })
        .await
    }
}

impl NativeBridge {
    async fn expect_ack(&self, command: BridgeCommand) -> Result<ActivationOutcome, BridgeError> {
        let wire_name = command.wire_name();
        match self.query(&command).await? {
            BridgePayload::Ack(ack) => Ok(ack),
            other => Err(unexpected_payload(wire_name, &other)),
        }
    }
}

fn unexpected_payload(command: &str, payload: &BridgePayload) -> BridgeError {
    BridgeError::ParseError {
        message: format!("unexpected payload variant for '{}': {:?}", command, payload),
    }
}
