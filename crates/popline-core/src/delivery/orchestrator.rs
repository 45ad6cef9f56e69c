//! Paste delivery orchestration.
//!
//! The orchestrator ties the resolver, space tracker, placement engine,
//! and multiplexer adapter together behind a small phase machine:
//! Idle -> Resolving -> Visible -> Delivering -> Idle. Nothing here is
//! fatal to the host process; every bridge/OS failure is converted into a
//! degraded-but-shown popup or a partial delivery report.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::bridge::{AppReference, AutomationBridge, BridgeError};
use crate::clipboard;
use crate::config::{PoplineConfig, WindowConfig};
use crate::delivery::errors::DeliveryError;
use crate::delivery::types::{
    DeliveryPath, DeliveryReport, PasteProgress, PopupHost, PopupPhase, ShowOutcome,
};
use crate::multiplexer::MultiplexerAdapter;
use crate::multiplexer::paste::{STANDARD_PASTE_CHORD, send_host_key_chord};
use crate::placement::{PlacementEngine, PopupSize};
use crate::platform::{CapabilityResolver, Platform, PlatformInfo};
use crate::spaces::{self, SpaceSignature};

/// Settle delay between setting the clipboard and injecting the paste
/// chord when no focus restore runs in between.
const PRE_INJECTION_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Top-level controller for the popup show/submit cycle.
///
/// All methods take `&mut self`, so cycles serialize by construction: a
/// second `show()` cannot start while one is resolving, and a call queued
/// behind an in-flight cycle observes its completed state (Visible plus
/// an up-to-date signature) and reuses instead of redoing the work.
pub struct PasteOrchestrator<B, M, H> {
    bridge: B,
    monitors: M,
    host: H,
    resolver: CapabilityResolver,
    multiplexer: MultiplexerAdapter,
    window: WindowConfig,
    phase: PopupPhase,
    previous_app: Option<AppReference>,
    last_signature: Option<SpaceSignature>,
}

impl<B, M, H> PasteOrchestrator<B, M, H>
where
    B: AutomationBridge,
    M: crate::placement::MonitorProvider,
    H: PopupHost,
{
    pub fn new(bridge: B, monitors: M, host: H, config: &PoplineConfig) -> Self {
        Self::with_environment(
            bridge,
            monitors,
            host,
            config,
            CapabilityResolver::new(),
            MultiplexerAdapter::new(),
        )
    }

    /// Construct with explicit resolver/adapter, letting tests (and
    /// diagnostics) pin the platform family.
    pub fn with_environment(
        bridge: B,
        monitors: M,
        host: H,
        config: &PoplineConfig,
        resolver: CapabilityResolver,
        multiplexer: MultiplexerAdapter,
    ) -> Self {
        Self {
            bridge,
            monitors,
            host,
            resolver,
            multiplexer,
            window: config.window.clone(),
            phase: PopupPhase::Idle,
            previous_app: None,
            last_signature: None,
        }
    }

    pub fn phase(&self) -> PopupPhase {
        self.phase
    }

    /// The app captured for the current show-cycle.
    pub fn previous_app(&self) -> Option<&AppReference> {
        self.previous_app.as_ref()
    }

    /// Update window settings for subsequent cycles (strategy, size).
    pub fn update_window_settings(&mut self, window: WindowConfig) {
        debug!(
            event = "core.delivery.window_settings_updated",
            position = %window.position,
            width = window.width,
            height = window.height
        );
        self.window = window;
    }

    /// Show the popup: resolve the environment, capture the previous app
    /// and space signature concurrently, decide window reuse vs
    /// recreation, compute placement, and display.
    pub async fn show(&mut self) -> Result<ShowOutcome, DeliveryError> {
        info!(event = "core.delivery.show_started");
        self.phase = PopupPhase::Resolving;

        // Capability resolution, previous-app capture, and signature
        // capture are independent; run them concurrently and join.
        let (info, app_result, initial_signature) = {
            let resolver = &mut self.resolver;
            let multiplexer = &mut self.multiplexer;
            let bridge = &self.bridge;
            tokio::join!(
                resolver.resolve(multiplexer),
                bridge.current_app(),
                async { spaces::current_signature(None) }
            )
        };

        // A failed capture resolves to an explicit "none": submit will
        // skip focus restore rather than target a stale app.
        self.previous_app = match app_result {
            Ok(app) => {
                debug!(
                    event = "core.delivery.previous_app_captured",
                    app = %app.name,
                    pid = ?app.process_id
                );
                Some(app)
            }
            Err(BridgeError::Unavailable { message }) => {
                // Expected where the platform has no window detection.
                debug!(
                    event = "core.delivery.previous_app_unavailable",
                    message = %message
                );
                None
            }
            Err(e) => {
                warn!(
                    event = "core.delivery.previous_app_capture_failed",
                    error = %e
                );
                None
            }
        };

        // Re-fingerprint with the captured app as context so the signature
        // moves when the active workspace changes even if the same window
        // set is nominally visible.
        let signature = match (&initial_signature, &self.previous_app) {
            (Some(_), Some(app)) => spaces::current_signature(Some(app)),
            _ => initial_signature,
        };

        let changed = spaces::has_changed(self.last_signature.as_ref(), signature.as_ref());
        let size = PopupSize {
            width: self.window.width,
            height: self.window.height,
        };

        let mut reused = true;
        if changed && self.host.exists() {
            debug!(
                event = "core.delivery.space_changed",
                last_signature = ?self.last_signature.as_ref().map(|s| s.as_str().to_string()),
                current_signature = ?signature.as_ref().map(|s| s.as_str().to_string())
            );
            self.host.destroy();
            reused = false;
        }
        if !self.host.exists() {
            if let Err(e) = self.host.create(size) {
                self.phase = PopupPhase::Idle;
                return Err(e);
            }
            reused = false;
        }

        // Placement runs when (re)creating, and on reuse only for
        // strategies whose reference point follows user focus.
        let strategy = self.window.position;
        let position = if !reused || strategy.is_reference_sensitive() {
            let engine = PlacementEngine::new(
                &self.bridge,
                &self.monitors,
                info.platform,
                info.capabilities,
            );
            match engine.compute_position(strategy, size).await {
                Ok(position) => {
                    self.host.set_position(position);
                    Some(position)
                }
                Err(e) => {
                    warn!(
                        event = "core.delivery.placement_failed",
                        strategy = %strategy,
                        error = %e,
                        message = "showing popup at its previous position"
                    );
                    None
                }
            }
        } else {
            None
        };

        self.host.show();
        self.last_signature = signature.clone();
        self.phase = PopupPhase::Visible;

        info!(
            event = "core.delivery.show_completed",
            reused_window = reused,
            previous_app = ?self.previous_app.as_ref().map(|a| a.name.clone()),
            position = ?position
        );

        Ok(ShowOutcome {
            reused_window: reused,
            position,
            previous_app: self.previous_app.clone(),
            space_signature: signature,
        })
    }

    /// Deliver captured text back into the previous app.
    ///
    /// Never errors: every failure downgrades into the report's progress.
    pub async fn submit(&mut self, text: &str) -> DeliveryReport {
        info!(event = "core.delivery.submit_started", text_len = text.len());
        self.phase = PopupPhase::Delivering;

        let info = {
            let resolver = &mut self.resolver;
            let multiplexer = &mut self.multiplexer;
            resolver.resolve(multiplexer).await
        };

        let report = if info.capabilities.requires_special_terminal_handling {
            let progress = {
                let multiplexer = &mut self.multiplexer;
                let bridge = &self.bridge;
                multiplexer.perform_paste(text, bridge).await
            };
            DeliveryReport {
                path: DeliveryPath::Multiplexer,
                progress,
            }
        } else {
            let progress = self.standard_paste(text, &info).await;
            // A failed focus restore means the environment shifted under
            // us; drop both caches so the next cycle re-resolves.
            let activation_attempted =
                self.previous_app.is_some() && info.capabilities.app_activation;
            if activation_attempted && progress.clipboard_set && !progress.focus_restored {
                self.resolver.clear_cache();
                self.multiplexer.clear_cache();
            }
            DeliveryReport {
                path: DeliveryPath::Standard,
                progress,
            }
        };

        self.phase = if self.host.is_visible() {
            PopupPhase::Visible
        } else {
            PopupPhase::Idle
        };

        info!(
            event = "core.delivery.submit_completed",
            path = %report.path,
            delivered = report.delivered(),
            furthest_step = ?report.progress.furthest().map(|s| s.to_string())
        );

        report
    }

    /// Standard delivery: clipboard, then focus restore + paste chord via
    /// the bridge's combined activation command, or chord injection alone
    /// when there is no app to restore.
    async fn standard_paste(&self, text: &str, info: &PlatformInfo) -> PasteProgress {
        let mut progress = PasteProgress::default();

        if let Err(e) = clipboard::set_text(info.platform, text).await {
            warn!(
                event = "core.delivery.clipboard_failed",
                error = %e
            );
            return progress;
        }
        progress.clipboard_set = true;

        match &self.previous_app {
            Some(app) if info.capabilities.app_activation => {
                match self.bridge.activate_and_paste(&app.name).await {
                    Ok(ack) if ack.success => {
                        progress.focus_restored = true;
                        progress.keystroke_injected = true;
                        debug!(
                            event = "core.delivery.activate_and_paste_completed",
                            app = %app.name
                        );
                    }
                    Ok(_) => {
                        warn!(
                            event = "core.delivery.activate_and_paste_rejected",
                            app = %app.name,
                            message = "clipboard remains set for manual paste"
                        );
                    }
                    Err(e) => {
                        warn!(
                            event = "core.delivery.activate_and_paste_failed",
                            app = %app.name,
                            error = %e,
                            message = "clipboard remains set for manual paste"
                        );
                    }
                }
            }
            _ => {
                debug!(
                    event = "core.delivery.focus_restore_skipped",
                    has_previous_app = self.previous_app.is_some(),
                    app_activation = info.capabilities.app_activation
                );
                if info.capabilities.native_keystroke_injection {
                    tokio::time::sleep(PRE_INJECTION_SETTLE_DELAY).await;
                    match self.bridge.inject_paste().await {
                        Ok(ack) if ack.success => {
                            progress.keystroke_injected = true;
                        }
                        outcome => {
                            warn!(
                                event = "core.delivery.paste_injection_failed",
                                error = ?outcome.err().map(|e| e.to_string())
                            );
                            if info.platform == Platform::Windows
                                && send_host_key_chord(STANDARD_PASTE_CHORD).await
                            {
                                progress.keystroke_injected = true;
                            }
                        }
                    }
                }
            }
        }

        progress
    }

    /// Hide the popup, keeping the window for reuse.
    pub fn hide(&mut self) {
        self.host.hide();
        self.phase = PopupPhase::Idle;
        debug!(event = "core.delivery.hidden");
    }

    /// Drop both environment caches so the next cycle re-resolves.
    pub fn refresh_environment(&mut self) {
        self.resolver.clear_cache();
        self.multiplexer.clear_cache();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{
        ActivationOutcome, ActiveWindowInfo, FocusedElementInfo, TextFieldInfo, WindowBounds,
    };
    use crate::placement::errors::PlacementError;
    use crate::placement::types::{Monitor, PlacementStrategy, Point, Position};
    use std::cell::Cell;

    /// Bridge stub: scripted current-app, call counters for the rest.
    struct StubBridge {
        app: Result<AppReference, BridgeError>,
        activate_calls: Cell<u32>,
        inject_calls: Cell<u32>,
    }

    impl StubBridge {
        fn with_app(name: &str) -> Self {
            Self {
                app: Ok(AppReference {
                    name: name.to_string(),
                    process_id: Some(4242),
                    bundle_id: None,
                    executable_path: None,
                }),
                activate_calls: Cell::new(0),
                inject_calls: Cell::new(0),
            }
        }

        fn with_app_timeout() -> Self {
            Self {
                app: Err(BridgeError::Timeout {
                    command: "current-app".to_string(),
                    timeout_ms: 3000,
                }),
                activate_calls: Cell::new(0),
                inject_calls: Cell::new(0),
            }
        }
    }

    impl AutomationBridge for StubBridge {
        async fn active_window(&self) -> Result<ActiveWindowInfo, BridgeError> {
            Ok(ActiveWindowInfo {
                bounds: WindowBounds::new(100, 100, 1000, 600).unwrap(),
                app_name: "StubApp".to_string(),
                executable_path: None,
                window_title: None,
            })
        }

        async fn current_app(&self) -> Result<AppReference, BridgeError> {
            self.app.clone()
        }

        async fn focused_text_field(&self) -> Result<TextFieldInfo, BridgeError> {
            Err(BridgeError::NotFound {
                message: "no_focused_element".to_string(),
            })
        }

        async fn focused_element(&self) -> Result<FocusedElementInfo, BridgeError> {
            Err(BridgeError::NotFound {
                message: "no_focused_element".to_string(),
            })
        }

        async fn inject_paste(&self) -> Result<ActivationOutcome, BridgeError> {
            self.inject_calls.set(self.inject_calls.get() + 1);
            Ok(ActivationOutcome {
                success: true,
                command: Some("paste".to_string()),
            })
        }

        async fn inject_multiplexer_paste(&self) -> Result<ActivationOutcome, BridgeError> {
            self.inject_calls.set(self.inject_calls.get() + 1);
            Ok(ActivationOutcome {
                success: true,
                command: Some("paste-wezterm".to_string()),
            })
        }

        async fn activate_by_name(&self, _: &str) -> Result<ActivationOutcome, BridgeError> {
            self.activate_calls.set(self.activate_calls.get() + 1);
            Ok(ActivationOutcome {
                success: true,
                command: None,
            })
        }

        async fn activate_by_id(&self, _: &str) -> Result<ActivationOutcome, BridgeError> {
            self.activate_calls.set(self.activate_calls.get() + 1);
            Ok(ActivationOutcome {
                success: true,
                command: None,
            })
        }

        async fn activate_and_paste(&self, _: &str) -> Result<ActivationOutcome, BridgeError> {
            self.activate_calls.set(self.activate_calls.get() + 1);
            Ok(ActivationOutcome {
                success: true,
                command: None,
            })
        }
    }

    struct FixedMonitors;

    impl crate::placement::MonitorProvider for FixedMonitors {
        fn monitors(&self) -> Result<Vec<Monitor>, PlacementError> {
            Ok(vec![Monitor {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                is_primary: true,
            }])
        }

        fn cursor_position(&self) -> Result<Point, PlacementError> {
            Err(PlacementError::CursorUnavailable {
                message: "not scripted".to_string(),
            })
        }
    }

    /// Popup host stub recording lifecycle calls.
    #[derive(Default)]
    struct StubHost {
        exists: bool,
        visible: bool,
        create_count: u32,
        destroy_count: u32,
        positions: Vec<Position>,
    }

    impl PopupHost for StubHost {
        fn exists(&self) -> bool {
            self.exists
        }

        fn is_visible(&self) -> bool {
            self.visible
        }

        fn create(&mut self, _size: PopupSize) -> Result<(), DeliveryError> {
            self.exists = true;
            self.create_count += 1;
            Ok(())
        }

        fn destroy(&mut self) {
            self.exists = false;
            self.destroy_count += 1;
        }

        fn set_position(&mut self, position: Position) {
            self.positions.push(position);
        }

        fn show(&mut self) {
            self.visible = true;
        }

        fn hide(&mut self) {
            self.visible = false;
        }
    }

    fn center_config() -> PoplineConfig {
        let mut config = PoplineConfig::default();
        config.window.position = PlacementStrategy::Center;
        config
    }

    fn orchestrator_for(
        platform: Platform,
        bridge: StubBridge,
        config: PoplineConfig,
    ) -> PasteOrchestrator<StubBridge, FixedMonitors, StubHost> {
        PasteOrchestrator::with_environment(
            bridge,
            FixedMonitors,
            StubHost::default(),
            &config,
            CapabilityResolver::for_platform(platform),
            MultiplexerAdapter::for_platform(platform),
        )
    }

    #[tokio::test]
    async fn test_show_creates_window_and_positions_center() {
        let mut orchestrator =
            orchestrator_for(Platform::MacOs, StubBridge::with_app("Code"), center_config());

        let outcome = orchestrator.show().await.unwrap();
        assert!(!outcome.reused_window);
        assert_eq!(outcome.position, Some(Position { x: 660, y: 290 }));
        assert_eq!(outcome.previous_app.unwrap().name, "Code");
        assert_eq!(orchestrator.phase(), PopupPhase::Visible);
        assert_eq!(orchestrator.host.create_count, 1);
        assert!(orchestrator.host.visible);
    }

    #[tokio::test]
    async fn test_show_recreates_when_signature_missing() {
        // Window enumeration is unavailable in the test environment, so
        // the signature is absent and every show conservatively recreates.
        let mut orchestrator =
            orchestrator_for(Platform::MacOs, StubBridge::with_app("Code"), center_config());

        let first = orchestrator.show().await.unwrap();
        assert!(!first.reused_window);
        let second = orchestrator.show().await.unwrap();
        assert!(!second.reused_window);
        assert_eq!(orchestrator.host.create_count, 2);
        assert_eq!(orchestrator.host.destroy_count, 1);
    }

    #[tokio::test]
    async fn test_app_capture_timeout_resolves_to_none() {
        let mut orchestrator = orchestrator_for(
            Platform::MacOs,
            StubBridge::with_app_timeout(),
            center_config(),
        );

        let outcome = orchestrator.show().await.unwrap();
        assert!(outcome.previous_app.is_none());
        assert!(orchestrator.previous_app().is_none());
        // The popup still appeared.
        assert_eq!(orchestrator.phase(), PopupPhase::Visible);
    }

    #[tokio::test]
    async fn test_submit_without_previous_app_skips_focus_restore() {
        let mut orchestrator = orchestrator_for(
            Platform::MacOs,
            StubBridge::with_app_timeout(),
            center_config(),
        );

        orchestrator.show().await.unwrap();
        let report = orchestrator.submit("hello").await;

        // No activation attempt was made, and nothing threw.
        assert_eq!(orchestrator.bridge.activate_calls.get(), 0);
        assert_eq!(report.path, DeliveryPath::Standard);
        assert!(!report.progress.focus_restored);
    }

    #[tokio::test]
    async fn test_submit_linux_takes_standard_path_without_injection() {
        use std::io::Write;

        // Plain Linux (no guest marker): standard path, clipboard-only;
        // keystroke injection is not a Linux capability. The kernel info
        // file is pinned so a WSL-kernel test host cannot flip the path.
        let mut kernel_info = tempfile::NamedTempFile::new().unwrap();
        write!(kernel_info, "Linux version 6.1.0-18-generic (gcc 12.2.0)").unwrap();

        let config = center_config();
        let mut orchestrator = PasteOrchestrator::with_environment(
            StubBridge::with_app_timeout(),
            FixedMonitors,
            StubHost::default(),
            &config,
            CapabilityResolver::for_platform(Platform::Linux),
            MultiplexerAdapter::for_platform(Platform::Linux)
                .with_kernel_info_path(kernel_info.path().to_path_buf()),
        );

        orchestrator.show().await.unwrap();
        let report = orchestrator.submit("hello").await;
        assert_eq!(report.path, DeliveryPath::Standard);
        assert_eq!(orchestrator.bridge.inject_calls.get(), 0);
        assert!(!report.progress.keystroke_injected);
    }

    #[tokio::test]
    async fn test_submit_multiplexer_path_when_guest_detected() {
        use std::io::Write;

        let mut kernel_info = tempfile::NamedTempFile::new().unwrap();
        write!(kernel_info, "Linux version 5.15.90.1-microsoft-standard-WSL2").unwrap();

        let config = center_config();
        let mut orchestrator = PasteOrchestrator::with_environment(
            StubBridge::with_app_timeout(),
            FixedMonitors,
            StubHost::default(),
            &config,
            CapabilityResolver::for_platform(Platform::Linux),
            MultiplexerAdapter::for_platform(Platform::Linux)
                .with_kernel_info_path(kernel_info.path().to_path_buf()),
        );

        orchestrator.show().await.unwrap();
        let report = orchestrator.submit("hello").await;
        assert_eq!(report.path, DeliveryPath::Multiplexer);
    }

    #[tokio::test]
    async fn test_hide_returns_to_idle() {
        let mut orchestrator =
            orchestrator_for(Platform::MacOs, StubBridge::with_app("Code"), center_config());

        orchestrator.show().await.unwrap();
        assert_eq!(orchestrator.phase(), PopupPhase::Visible);

        orchestrator.hide();
        assert_eq!(orchestrator.phase(), PopupPhase::Idle);
        assert!(!orchestrator.host.visible);
        // The window survives for reuse.
        assert!(orchestrator.host.exists);
    }

    #[tokio::test]
    async fn test_update_window_settings_applies_to_next_show() {
        let mut orchestrator =
            orchestrator_for(Platform::MacOs, StubBridge::with_app("Code"), center_config());

        orchestrator.show().await.unwrap();

        let mut window = WindowConfig::default();
        window.position = PlacementStrategy::Center;
        window.width = 400;
        window.height = 200;
        orchestrator.update_window_settings(window);

        let outcome = orchestrator.show().await.unwrap();
        // (1920-400)/2 = 760, (1080-200)/2 - 100 = 340.
        assert_eq!(outcome.position, Some(Position { x: 760, y: 340 }));
    }
}
