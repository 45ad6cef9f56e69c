//! Multiplexer paste delivery.
//!
//! Multiplexers reserve the standard paste chord for their own copy mode,
//! so delivery goes: host clipboard, focus restore to the multiplexer
//! window, then the distinct chord. Every step past the clipboard is
//! best-effort; a set clipboard without a perfect key injection is still a
//! partial success from the user's perspective.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bridge::AutomationBridge;
use crate::clipboard;
use crate::delivery::types::PasteProgress;
use crate::multiplexer::detect::MultiplexerAdapter;
use crate::platform::types::Platform;

/// Settle delay after setting the clipboard.
const CLIPBOARD_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Settle delay after focus restore, before injecting the chord.
const INJECTION_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// SendKeys notation for the multiplexer paste chord (Ctrl+Shift+V).
pub const MULTIPLEXER_PASTE_CHORD: &str = "^+v";

/// SendKeys notation for the standard paste chord (Ctrl+V).
pub const STANDARD_PASTE_CHORD: &str = "^v";

impl MultiplexerAdapter {
    /// Deliver text into the multiplexer.
    ///
    /// Pipeline: (1) set the host clipboard - via the guest bridge when
    /// running inside the guest layer, directly on the host otherwise;
    /// (2) settle; (3) restore focus to the multiplexer window by pid;
    /// (4) settle; (5) inject the multiplexer chord via the bridge,
    /// falling back to an OS-level key send. Returns how far the pipeline
    /// got; clipboard failure aborts with no step reached.
    pub async fn perform_paste<B: AutomationBridge>(
        &mut self,
        text: &str,
        bridge: &B,
    ) -> PasteProgress {
        let context = self.detect().await;
        let mut progress = PasteProgress::default();

        let clipboard_result = if context.is_multiplexer_environment
            && self.platform() == Platform::Linux
        {
            clipboard::set_text_via_guest_bridge(text).await
        } else {
            clipboard::set_text(Platform::Windows, text).await
        };

        if let Err(e) = clipboard_result {
            warn!(
                event = "core.multiplexer.clipboard_failed",
                error = %e
            );
            return progress;
        }
        progress.clipboard_set = true;
        debug!(
            event = "core.multiplexer.clipboard_set",
            text_len = text.len()
        );

        tokio::time::sleep(CLIPBOARD_SETTLE_DELAY).await;

        match context.terminal_pid {
            Some(pid) => {
                if restore_host_focus(pid).await {
                    progress.focus_restored = true;
                    debug!(event = "core.multiplexer.focus_restored", pid = pid);
                } else {
                    warn!(
                        event = "core.multiplexer.focus_restore_failed",
                        pid = pid,
                        message = "continuing - clipboard is already set"
                    );
                }
            }
            None => {
                debug!(
                    event = "core.multiplexer.focus_restore_skipped",
                    message = "no terminal pid captured"
                );
            }
        }

        tokio::time::sleep(INJECTION_SETTLE_DELAY).await;

        match bridge.inject_multiplexer_paste().await {
            Ok(ack) if ack.success => {
                progress.keystroke_injected = true;
                info!(event = "core.multiplexer.paste_injected", via = "bridge");
            }
            outcome => {
                warn!(
                    event = "core.multiplexer.bridge_injection_failed",
                    outcome = ?outcome.err().map(|e| e.to_string()),
                    message = "falling back to OS-level key send"
                );
                if send_host_key_chord(MULTIPLEXER_PASTE_CHORD).await {
                    progress.keystroke_injected = true;
                    info!(event = "core.multiplexer.paste_injected", via = "sendkeys");
                } else {
                    warn!(event = "core.multiplexer.injection_fallback_failed");
                }
            }
        }

        progress
    }
}

/// Restore foreground focus to a host process by pid.
///
/// The pid is interpolated as a bare integer; no user text enters this
/// script.
async fn restore_host_focus(pid: u32) -> bool {
    let script = format!(
        concat!(
            "Add-Type -TypeDefinition 'using System; using System.Runtime.InteropServices; ",
            "public class Win32 {{ ",
            "[DllImport(\"user32.dll\")] public static extern bool SetForegroundWindow(IntPtr hWnd); ",
            "[DllImport(\"user32.dll\")] public static extern bool ShowWindow(IntPtr hWnd, int nCmdShow); ",
            "}}'; ",
            "$proc = Get-Process -Id {} -ErrorAction SilentlyContinue; ",
            "if ($proc -and $proc.MainWindowHandle) {{ ",
            "[Win32]::ShowWindow($proc.MainWindowHandle, 9); ",
            "[Win32]::SetForegroundWindow($proc.MainWindowHandle) ",
            "}}"
        ),
        pid
    );
    run_host_command(&["-NoProfile", "-Command", &script]).await
}

/// Inject a key chord on the host via SendKeys.
///
/// Chords are compile-time constants in SendKeys notation, not user text.
pub(crate) async fn send_host_key_chord(chord: &str) -> bool {
    let script = format!(
        "Add-Type -AssemblyName System.Windows.Forms; [System.Windows.Forms.SendKeys]::SendWait('{}')",
        chord
    );
    run_host_command(&["-NoProfile", "-Command", &script]).await
}

/// Run a PowerShell command on the host, reporting plain success.
async fn run_host_command(args: &[&str]) -> bool {
    let program = crate::clipboard::powershell_program();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) if output.status.success() => true,
        Ok(Ok(output)) => {
            debug!(
                event = "core.multiplexer.host_command_failed",
                exit_code = ?output.status.code()
            );
            false
        }
        Ok(Err(e)) => {
            debug!(
                event = "core.multiplexer.host_command_spawn_failed",
                error = %e
            );
            false
        }
        Err(_) => {
            debug!(event = "core.multiplexer.host_command_timeout");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_notation() {
        assert_eq!(MULTIPLEXER_PASTE_CHORD, "^+v");
        assert_eq!(STANDARD_PASTE_CHORD, "^v");
        assert_ne!(
            MULTIPLEXER_PASTE_CHORD, STANDARD_PASTE_CHORD,
            "multiplexer chord must differ from the standard chord"
        );
    }

    #[test]
    fn test_settle_delays_ordering() {
        // Clipboard settle is shorter than the injection settle; the
        // injection needs the focus switch to have landed.
        assert!(CLIPBOARD_SETTLE_DELAY < INJECTION_SETTLE_DELAY);
        assert_eq!(CLIPBOARD_SETTLE_DELAY, Duration::from_millis(50));
        assert_eq!(INJECTION_SETTLE_DELAY, Duration::from_millis(100));
    }
}
