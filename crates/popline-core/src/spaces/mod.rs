//! Desktop space fingerprinting.
//!
//! A popup window created on one virtual desktop cannot simply be re-shown
//! after the user switches workspaces - it would appear on the old one.
//! The tracker fingerprints the current space from the visible top-level
//! window set combined with the context app, so the orchestrator can
//! decide reuse vs destroy-and-recreate. A missing signature is treated as
//! "always changed": recreating is cheap, rendering on a stale desktop is
//! not.

use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::bridge::AppReference;

#[cfg(target_os = "macos")]
use tracing::debug;

/// Opaque fingerprint of the current virtual-desktop state.
///
/// Two captures describe the same space iff the signatures are byte-equal;
/// there is no fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpaceSignature(String);

impl SpaceSignature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpaceSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fingerprint the current space, or `None` when window enumeration is
/// unavailable on this platform or fails.
pub fn current_signature(context_app: Option<&AppReference>) -> Option<SpaceSignature> {
    let entries = visible_window_entries()?;
    Some(signature_from_entries(
        &entries,
        context_app.map(|app| app.name.as_str()),
    ))
}

/// Whether the space changed between two captures.
///
/// A missing signature on either side reports "changed" so the popup is
/// conservatively recreated.
pub fn has_changed(previous: Option<&SpaceSignature>, current: Option<&SpaceSignature>) -> bool {
    match (previous, current) {
        (Some(previous), Some(current)) => previous != current,
        _ => true,
    }
}

/// Build a signature from (app name, window id) entries plus the context
/// app. Pure so the fingerprint is testable without OS access.
pub fn signature_from_entries(
    entries: &[(String, u32)],
    context_app: Option<&str>,
) -> SpaceSignature {
    let mut keys: Vec<String> = entries
        .iter()
        .map(|(app, id)| format!("{}:{}", app, id))
        .collect();
    keys.sort();

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    keys.hash(&mut hasher);
    context_app.unwrap_or("-").hash(&mut hasher);

    SpaceSignature(format!(
        "v1:{}:{:016x}:{}",
        keys.len(),
        hasher.finish(),
        context_app.unwrap_or("-")
    ))
}

/// Enumerate visible top-level windows as (app name, window id) pairs.
#[cfg(target_os = "macos")]
fn visible_window_entries() -> Option<Vec<(String, u32)>> {
    let windows = match xcap::Window::all() {
        Ok(windows) => windows,
        Err(e) => {
            debug!(
                event = "core.spaces.window_enumeration_failed",
                error = %e
            );
            return None;
        }
    };

    let entries = windows
        .into_iter()
        .filter_map(|w| {
            let id = w.id().ok()?;
            let width = w.width().ok()?;
            let height = w.height().ok()?;
            // Skip tiny windows (likely invisible/system windows)
            if width < 10 || height < 10 {
                return None;
            }
            if w.is_minimized().unwrap_or(false) {
                return None;
            }
            let app_name = w.app_name().ok().unwrap_or_default();
            Some((app_name, id))
        })
        .collect();

    Some(entries)
}

#[cfg(not(target_os = "macos"))]
fn visible_window_entries() -> Option<Vec<(String, u32)>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<(String, u32)> {
        vec![
            ("Terminal".to_string(), 11),
            ("Safari".to_string(), 22),
            ("Code".to_string(), 33),
        ]
    }

    #[test]
    fn test_same_inputs_same_signature() {
        let a = signature_from_entries(&entries(), Some("Terminal"));
        let b = signature_from_entries(&entries(), Some("Terminal"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_entry_order_is_irrelevant() {
        let mut shuffled = entries();
        shuffled.reverse();
        let a = signature_from_entries(&entries(), Some("Terminal"));
        let b = signature_from_entries(&shuffled, Some("Terminal"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_window_set_change_changes_signature() {
        let a = signature_from_entries(&entries(), Some("Terminal"));
        let mut changed = entries();
        changed.push(("Mail".to_string(), 44));
        let b = signature_from_entries(&changed, Some("Terminal"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_context_app_change_changes_signature() {
        let a = signature_from_entries(&entries(), Some("Terminal"));
        let b = signature_from_entries(&entries(), Some("Safari"));
        let c = signature_from_entries(&entries(), None);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_has_changed_equality() {
        let a = signature_from_entries(&entries(), Some("Terminal"));
        let b = signature_from_entries(&entries(), Some("Terminal"));
        assert!(!has_changed(Some(&a), Some(&b)));

        let c = signature_from_entries(&entries(), Some("Safari"));
        assert!(has_changed(Some(&a), Some(&c)));
    }

    #[test]
    fn test_missing_signature_always_changed() {
        let a = signature_from_entries(&entries(), None);
        assert!(has_changed(None, Some(&a)));
        assert!(has_changed(Some(&a), None));
        assert!(has_changed(None, None));
    }
}
