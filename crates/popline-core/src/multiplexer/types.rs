use serde::Serialize;

/// Detected terminal-multiplexer environment.
///
/// Produced by the adapter's `detect()`; read-only to every other
/// component. Absent fields mean the corresponding probe failed or did
/// not apply - never that detection errored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerminalContext {
    /// True when the session runs inside the multiplexer environment
    /// (guest layer detected, or the multiplexer process found on the
    /// host) and paste delivery must take the special path.
    pub is_multiplexer_environment: bool,

    /// Guest OS distribution name (e.g. `Ubuntu`).
    pub guest_distribution: Option<String>,

    /// Guest kernel release string.
    pub guest_kernel: Option<String>,

    /// Working directory at detection time.
    pub working_directory: Option<String>,

    /// Main window title of the multiplexer process on the host.
    pub window_title: Option<String>,

    /// Process id of the multiplexer on the host, used for focus restore.
    pub terminal_pid: Option<u32>,

    /// Host-side profile directory (guest-to-host path mapping anchor).
    pub host_profile_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_multiplexer() {
        let context = TerminalContext::default();
        assert!(!context.is_multiplexer_environment);
        assert!(context.guest_distribution.is_none());
        assert!(context.terminal_pid.is_none());
    }
}
