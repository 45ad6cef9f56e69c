//! Platform capability resolution with a short-lived cache.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::multiplexer::MultiplexerAdapter;
use crate::platform::types::{Platform, PlatformCapabilities, PlatformInfo};

/// How long a resolved `PlatformInfo` stays valid.
pub const CAPABILITY_CACHE_TTL: Duration = Duration::from_secs(10);

/// Static capability table keyed by OS family.
///
/// Only `requires_special_terminal_handling` is dynamic; the resolver
/// flips it after multiplexer detection.
pub fn base_capabilities(platform: Platform) -> PlatformCapabilities {
    match platform {
        Platform::MacOs => PlatformCapabilities {
            native_window_detection: true,
            native_keystroke_injection: true,
            native_text_field_detection: true,
            clipboard_integration: true,
            app_activation: true,
            requires_special_terminal_handling: false,
        },
        Platform::Windows => PlatformCapabilities {
            native_window_detection: true,
            native_keystroke_injection: true,
            native_text_field_detection: true,
            clipboard_integration: true,
            app_activation: true,
            requires_special_terminal_handling: false,
        },
        // X11/Wayland automation is not wired up; clipboard tools are the
        // only dependable primitive.
        Platform::Linux => PlatformCapabilities {
            native_window_detection: false,
            native_keystroke_injection: false,
            native_text_field_detection: false,
            clipboard_integration: true,
            app_activation: false,
            requires_special_terminal_handling: false,
        },
    }
}

/// Memoizing resolver for [`PlatformInfo`].
///
/// Owns the cache explicitly (timestamp + TTL) instead of living in an
/// ambient singleton; callers pass it by reference where needed. Any read
/// past the TTL recomputes synchronously before returning.
pub struct CapabilityResolver {
    platform: Platform,
    cached: Option<CachedInfo>,
    ttl: Duration,
}

struct CachedInfo {
    info: PlatformInfo,
    fetched_at: Instant,
}

impl CapabilityResolver {
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    /// Resolver pinned to a specific platform (used by tests to exercise
    /// other families' capability tables).
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            cached: None,
            ttl: CAPABILITY_CACHE_TTL,
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Resolve the platform info, reusing the cache inside its TTL.
    ///
    /// The multiplexer adapter is consulted for the Windows/Linux families
    /// so `requires_special_terminal_handling` reflects the live
    /// environment.
    pub async fn resolve(&mut self, multiplexer: &mut MultiplexerAdapter) -> PlatformInfo {
        if let Some(cached) = &self.cached
            && cached.fetched_at.elapsed() < self.ttl
        {
            return cached.info.clone();
        }

        let mut capabilities = base_capabilities(self.platform);
        let mut terminal_context = None;
        let mut special_environment = None;

        if self.platform.probes_multiplexer() {
            let context = multiplexer.detect().await;
            if context.is_multiplexer_environment {
                capabilities.requires_special_terminal_handling = true;
                special_environment = Some(match &context.guest_distribution {
                    Some(distribution) => format!("Wezterm+WSL({})", distribution),
                    None => "Wezterm".to_string(),
                });
            }
            terminal_context = Some(context);
        }

        let info = PlatformInfo {
            platform: self.platform,
            platform_name: self.platform.display_name().to_string(),
            capabilities,
            terminal_context,
            special_environment,
            resolved_at: chrono::Utc::now(),
        };

        debug!(
            event = "core.platform.resolved",
            platform = %self.platform,
            special_handling = capabilities.requires_special_terminal_handling,
            special_environment = ?info.special_environment
        );

        self.cached = Some(CachedInfo {
            info: info.clone(),
            fetched_at: Instant::now(),
        });

        info
    }

    /// Drop the cached info so the next `resolve()` recomputes.
    ///
    /// Used when the environment is known to have changed, e.g. after a
    /// foreground-app switch failure.
    pub fn clear_cache(&mut self) {
        self.cached = None;
        debug!(event = "core.platform.cache_cleared");
    }
}

impl Default for CapabilityResolver {
    fn default() -> Self {
        Self::new()
    }
}
