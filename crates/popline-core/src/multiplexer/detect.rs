//! Multiplexer environment detection.
//!
//! The guest layer is recognized by the vendor marker in the kernel info
//! file; on the Windows host the multiplexer is recognized by its process.
//! Every probe is individually fault-tolerant: a failed lookup yields an
//! absent field, never an error that aborts detection.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::multiplexer::types::TerminalContext;
use crate::platform::types::Platform;

/// How long a detected `TerminalContext` stays valid.
pub const TERMINAL_CONTEXT_TTL: Duration = Duration::from_secs(5);

/// Kernel info file carrying the guest-layer vendor marker.
pub const GUEST_KERNEL_INFO_PATH: &str = "/proc/version";

/// Vendor marker found in the kernel info file inside the guest layer.
/// Matched case-insensitively: the first guest generation reports
/// `Microsoft`, the second `microsoft-standard`.
const GUEST_VENDOR_MARKER: &str = "microsoft";

/// Process names the multiplexer runs under on the host.
pub const MULTIPLEXER_PROCESS_NAMES: &[&str] = &["wezterm-gui", "wezterm"];

const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Per-probe timeout; a hung probe must not stall detection.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Detects and caches the terminal-multiplexer environment.
pub struct MultiplexerAdapter {
    platform: Platform,
    cached: Option<(TerminalContext, Instant)>,
    ttl: Duration,
    kernel_info_path: PathBuf,
}

impl MultiplexerAdapter {
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Adapter pinned to a specific platform (used by tests).
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            cached: None,
            ttl: TERMINAL_CONTEXT_TTL,
            kernel_info_path: PathBuf::from(GUEST_KERNEL_INFO_PATH),
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the kernel info file path (used by tests to script the
    /// guest marker).
    pub fn with_kernel_info_path(mut self, path: PathBuf) -> Self {
        self.kernel_info_path = path;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Detect the multiplexer environment, reusing the cache inside its
    /// TTL. Never errors; total probe failure yields the non-multiplexer
    /// context.
    pub async fn detect(&mut self) -> TerminalContext {
        if let Some((context, fetched_at)) = &self.cached
            && fetched_at.elapsed() < self.ttl
        {
            return context.clone();
        }

        let context = self.probe().await;

        debug!(
            event = "core.multiplexer.detect_completed",
            is_multiplexer = context.is_multiplexer_environment,
            distribution = ?context.guest_distribution,
            terminal_pid = ?context.terminal_pid
        );

        self.cached = Some((context.clone(), Instant::now()));
        context
    }

    async fn probe(&self) -> TerminalContext {
        let mut context = TerminalContext::default();

        match tokio::fs::read_to_string(&self.kernel_info_path).await {
            Ok(version) if version.to_lowercase().contains(GUEST_VENDOR_MARKER) => {
                debug!(event = "core.multiplexer.guest_marker_found");
                context.is_multiplexer_environment = true;
                context.guest_distribution = read_guest_distribution().await;
                context.guest_kernel = run_probe("uname", &["-r"]).await;
                context.host_profile_path =
                    run_probe("cmd.exe", &["/c", "echo %USERPROFILE%"]).await;
            }
            Ok(_) => {
                debug!(event = "core.multiplexer.guest_marker_absent");
            }
            Err(e) => {
                // No kernel info file at all - not the guest layer.
                debug!(
                    event = "core.multiplexer.kernel_info_unreadable",
                    error = %e
                );
            }
        }

        if self.platform == Platform::Windows
            && let Some((pid, name)) = find_multiplexer_process()
        {
            debug!(
                event = "core.multiplexer.host_process_found",
                pid = pid,
                process_name = %name
            );
            context.is_multiplexer_environment = true;
            context.terminal_pid = Some(pid);
            context.window_title = query_main_window_title(pid).await;
        }

        if context.is_multiplexer_environment {
            context.working_directory = std::env::current_dir()
                .ok()
                .map(|p| p.display().to_string());
        }

        context
    }

    /// Drop the cached context so the next `detect()` re-probes.
    pub fn clear_cache(&mut self) {
        self.cached = None;
        debug!(event = "core.multiplexer.cache_cleared");
    }
}

impl Default for MultiplexerAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Distribution name from the guest's os-release file.
async fn read_guest_distribution() -> Option<String> {
    let content = tokio::fs::read_to_string(OS_RELEASE_PATH).await.ok()?;
    parse_os_release_name(&content)
}

/// Extract the NAME= value from os-release content.
pub(crate) fn parse_os_release_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.strip_prefix("NAME=")?;
        let trimmed = value.trim().trim_matches('"');
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Run a best-effort shell probe, returning trimmed stdout on success.
async fn run_probe(program: &str, args: &[&str]) -> Option<String> {
    let result = tokio::time::timeout(
        PROBE_TIMEOUT,
        tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await;

    match result {
        Ok(Ok(output)) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!stdout.is_empty()).then_some(stdout)
        }
        Ok(Ok(output)) => {
            debug!(
                event = "core.multiplexer.probe_failed",
                program = program,
                exit_code = ?output.status.code()
            );
            None
        }
        Ok(Err(e)) => {
            debug!(
                event = "core.multiplexer.probe_spawn_failed",
                program = program,
                error = %e
            );
            None
        }
        Err(_) => {
            debug!(
                event = "core.multiplexer.probe_timeout",
                program = program,
                timeout_ms = PROBE_TIMEOUT.as_millis() as u64
            );
            None
        }
    }
}

/// Find a running multiplexer process on the host.
fn find_multiplexer_process() -> Option<(u32, String)> {
    let mut system = sysinfo::System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

    for (pid, process) in system.processes() {
        let name = process.name().to_string_lossy().to_string();
        let base = name.to_lowercase();
        let base = base.trim_end_matches(".exe");
        if MULTIPLEXER_PROCESS_NAMES.contains(&base) {
            return Some((pid.as_u32(), name));
        }
    }

    None
}

/// Main window title of a host process, via PowerShell.
async fn query_main_window_title(pid: u32) -> Option<String> {
    let script = format!(
        "(Get-Process -Id {} -ErrorAction SilentlyContinue).MainWindowTitle",
        pid
    );
    run_probe(
        crate::clipboard::powershell_program(),
        &["-NoProfile", "-Command", &script],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn adapter_with_kernel_info(content: &str) -> (MultiplexerAdapter, tempfile::NamedTempFile) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        let adapter = MultiplexerAdapter::for_platform(Platform::Linux)
            .with_kernel_info_path(file.path().to_path_buf());
        (adapter, file)
    }

    #[tokio::test]
    async fn test_marker_absent_is_not_multiplexer() {
        let (mut adapter, _file) =
            adapter_with_kernel_info("Linux version 6.1.0-18-generic (gcc 12.2.0)");
        let context = adapter.detect().await;
        assert!(!context.is_multiplexer_environment);
        assert!(context.guest_distribution.is_none());
        assert!(context.working_directory.is_none());
    }

    #[tokio::test]
    async fn test_first_generation_marker_detected() {
        let (mut adapter, _file) = adapter_with_kernel_info(
            "Linux version 4.4.0-19041-Microsoft (Microsoft@Microsoft.com)",
        );
        let context = adapter.detect().await;
        assert!(context.is_multiplexer_environment);
        assert!(context.working_directory.is_some());
    }

    #[tokio::test]
    async fn test_second_generation_marker_detected() {
        let (mut adapter, _file) =
            adapter_with_kernel_info("Linux version 5.15.90.1-microsoft-standard-WSL2");
        let context = adapter.detect().await;
        assert!(context.is_multiplexer_environment);
    }

    #[tokio::test]
    async fn test_missing_kernel_info_is_not_multiplexer() {
        let mut adapter = MultiplexerAdapter::for_platform(Platform::Linux)
            .with_kernel_info_path(PathBuf::from("/nonexistent/popline/version"));
        let context = adapter.detect().await;
        assert!(!context.is_multiplexer_environment);
    }

    #[tokio::test]
    async fn test_detect_uses_cache_within_ttl() {
        let (mut adapter, file) = adapter_with_kernel_info("microsoft-standard");
        let first = adapter.detect().await;
        assert!(first.is_multiplexer_environment);

        // Remove the marker file; the cached context must still be served.
        drop(file);
        let second = adapter.detect().await;
        assert!(second.is_multiplexer_environment);

        // Clearing the cache forces a re-probe, which now finds nothing.
        adapter.clear_cache();
        let third = adapter.detect().await;
        assert!(!third.is_multiplexer_environment);
    }

    #[test]
    fn test_parse_os_release_name() {
        let content = "PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"\nNAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"";
        assert_eq!(parse_os_release_name(content), Some("Ubuntu".to_string()));
    }

    #[test]
    fn test_parse_os_release_name_unquoted() {
        assert_eq!(
            parse_os_release_name("NAME=Debian\nID=debian"),
            Some("Debian".to_string())
        );
    }

    #[test]
    fn test_parse_os_release_name_missing() {
        assert_eq!(parse_os_release_name("ID=alpine"), None);
        assert_eq!(parse_os_release_name(""), None);
    }
}
