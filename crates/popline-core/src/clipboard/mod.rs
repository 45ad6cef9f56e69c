//! System clipboard integration.
//!
//! Each platform sets the clipboard through its native tool: `pbcopy` on
//! macOS, `Set-Clipboard` on Windows, `xclip`/`xsel` on Linux, and
//! `clip.exe` as the guest-to-host bridge inside the guest layer. Text is
//! piped over stdin wherever the tool allows it, so only the PowerShell
//! path needs escaping.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::errors::PoplineError;
use crate::escape::powershell_escape;
use crate::platform::types::Platform;

/// Timeout for a clipboard tool invocation.
const CLIPBOARD_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("No clipboard tool available: {message}")]
    ToolNotFound { message: String },

    #[error("Clipboard command failed: {message}")]
    CommandFailed { message: String },
}

impl PoplineError for ClipboardError {
    fn error_code(&self) -> &'static str {
        match self {
            ClipboardError::ToolNotFound { .. } => "CLIPBOARD_TOOL_NOT_FOUND",
            ClipboardError::CommandFailed { .. } => "CLIPBOARD_COMMAND_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        // A missing xclip/xsel is actionable by the user.
        matches!(self, ClipboardError::ToolNotFound { .. })
    }
}

/// PowerShell program name: plain on the host, `.exe` via the guest
/// layer's interop.
pub(crate) fn powershell_program() -> &'static str {
    if cfg!(windows) { "powershell" } else { "powershell.exe" }
}

/// Set the system clipboard to `text`.
pub async fn set_text(platform: Platform, text: &str) -> Result<(), ClipboardError> {
    match platform {
        Platform::MacOs => pipe_to_tool("pbcopy", &[], text).await,
        Platform::Windows => {
            let script = format!("Set-Clipboard -Value '{}'", powershell_escape(text));
            run_tool(powershell_program(), &["-NoProfile", "-Command", &script]).await
        }
        Platform::Linux => set_text_linux(text).await,
    }
}

/// Set the host clipboard from inside the guest layer via `clip.exe`.
pub async fn set_text_via_guest_bridge(text: &str) -> Result<(), ClipboardError> {
    pipe_to_tool("clip.exe", &[], text).await
}

/// Linux clipboard via whichever of xclip/xsel is installed.
async fn set_text_linux(text: &str) -> Result<(), ClipboardError> {
    if which::which("xclip").is_ok() {
        return pipe_to_tool("xclip", &["-selection", "clipboard"], text).await;
    }
    if which::which("xsel").is_ok() {
        return pipe_to_tool("xsel", &["--clipboard", "--input"], text).await;
    }
    Err(ClipboardError::ToolNotFound {
        message: "neither xclip nor xsel found on PATH".to_string(),
    })
}

/// Pipe text into a clipboard tool over stdin.
async fn pipe_to_tool(program: &str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
    let run = async {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClipboardError::CommandFailed {
                message: format!("failed to spawn '{}': {}", program, e),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ClipboardError::CommandFailed {
            message: format!("no stdin handle for '{}'", program),
        })?;
        stdin
            .write_all(text.as_bytes())
            .await
            .map_err(|e| ClipboardError::CommandFailed {
                message: format!("failed to write to '{}': {}", program, e),
            })?;
        drop(stdin);

        let status = child.wait().await.map_err(|e| ClipboardError::CommandFailed {
            message: format!("failed to wait for '{}': {}", program, e),
        })?;

        if !status.success() {
            return Err(ClipboardError::CommandFailed {
                message: format!("'{}' exited with {:?}", program, status.code()),
            });
        }

        debug!(
            event = "core.clipboard.set_completed",
            program = program,
            text_len = text.len()
        );
        Ok(())
    };

    tokio::time::timeout(CLIPBOARD_TIMEOUT, run)
        .await
        .map_err(|_| ClipboardError::CommandFailed {
            message: format!("'{}' timed out", program),
        })?
}

/// Run a clipboard tool that takes its payload via arguments.
async fn run_tool(program: &str, args: &[&str]) -> Result<(), ClipboardError> {
    let output = tokio::time::timeout(
        CLIPBOARD_TIMEOUT,
        tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| ClipboardError::CommandFailed {
        message: format!("'{}' timed out", program),
    })?
    .map_err(|e| ClipboardError::CommandFailed {
        message: format!("failed to spawn '{}': {}", program, e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ClipboardError::CommandFailed {
            message: format!("'{}' exited with {:?}: {}", program, output.status.code(), stderr),
        });
    }

    debug!(event = "core.clipboard.set_completed", program = program);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let missing = ClipboardError::ToolNotFound {
            message: "neither xclip nor xsel found on PATH".to_string(),
        };
        assert_eq!(missing.error_code(), "CLIPBOARD_TOOL_NOT_FOUND");
        assert!(missing.is_user_error());

        let failed = ClipboardError::CommandFailed {
            message: "'pbcopy' exited with Some(1)".to_string(),
        };
        assert_eq!(failed.error_code(), "CLIPBOARD_COMMAND_FAILED");
        assert!(!failed.is_user_error());
    }

    #[test]
    fn test_powershell_program_name() {
        let program = powershell_program();
        if cfg!(windows) {
            assert_eq!(program, "powershell");
        } else {
            assert_eq!(program, "powershell.exe");
        }
    }

    #[tokio::test]
    async fn test_pipe_to_missing_tool_fails() {
        let result = pipe_to_tool("definitely-not-a-clipboard-tool-12345", &[], "text").await;
        assert!(matches!(result, Err(ClipboardError::CommandFailed { .. })));
    }
}
