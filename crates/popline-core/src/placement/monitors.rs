//! Monitor and pointer location providers.

use crate::placement::errors::PlacementError;
use crate::placement::types::{Monitor, Point};

#[cfg(target_os = "macos")]
use tracing::debug;

/// Source of monitor geometry and the pointer location.
///
/// The placement engine only talks to this trait so tests can inject fixed
/// monitor layouts; [`SystemMonitors`] is the real implementation.
pub trait MonitorProvider {
    /// All monitors in the virtual screen space.
    fn monitors(&self) -> Result<Vec<Monitor>, PlacementError>;

    /// Current pointer location.
    fn cursor_position(&self) -> Result<Point, PlacementError>;

    /// The primary monitor (falls back to the first enumerated one).
    fn primary(&self) -> Result<Monitor, PlacementError> {
        let monitors = self.monitors()?;
        monitors
            .iter()
            .find(|m| m.is_primary)
            .or_else(|| monitors.first())
            .copied()
            .ok_or_else(|| PlacementError::MonitorUnavailable {
                message: "no monitors enumerated".to_string(),
            })
    }

    /// The monitor containing the reference point, or the nearest one.
    fn nearest(&self, point: Point) -> Result<Monitor, PlacementError> {
        let monitors = self.monitors()?;
        if let Some(containing) = monitors.iter().find(|m| m.contains(point)) {
            return Ok(*containing);
        }
        monitors
            .iter()
            .min_by_key(|m| m.distance_squared_to(point))
            .copied()
            .ok_or_else(|| PlacementError::MonitorUnavailable {
                message: "no monitors enumerated".to_string(),
            })
    }
}

/// Monitor provider backed by the OS screen APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMonitors;

#[cfg(target_os = "macos")]
impl MonitorProvider for SystemMonitors {
    fn monitors(&self) -> Result<Vec<Monitor>, PlacementError> {
        let monitors =
            xcap::Monitor::all().map_err(|e| PlacementError::MonitorUnavailable {
                message: e.to_string(),
            })?;

        let result: Vec<Monitor> = monitors
            .into_iter()
            .filter_map(|m| {
                // Skip monitors with unreadable geometry instead of
                // failing the whole enumeration.
                let x = m.x().ok()?;
                let y = m.y().ok()?;
                let width = m.width().ok()?;
                let height = m.height().ok()?;
                let is_primary = m.is_primary().unwrap_or(false);

                if width == 0 || height == 0 {
                    debug!(
                        event = "core.placement.monitor_skipped",
                        reason = "zero_dimension",
                        x,
                        y
                    );
                    return None;
                }

                Some(Monitor {
                    x,
                    y,
                    width,
                    height,
                    is_primary,
                })
            })
            .collect();

        if result.is_empty() {
            return Err(PlacementError::MonitorUnavailable {
                message: "no usable monitors enumerated".to_string(),
            });
        }

        Ok(result)
    }

    fn cursor_position(&self) -> Result<Point, PlacementError> {
        use core_graphics::event::CGEvent;
        use core_graphics::event_source::{CGEventSource, CGEventSourceStateID};

        let source = CGEventSource::new(CGEventSourceStateID::CombinedSessionState).map_err(
            |_| PlacementError::CursorUnavailable {
                message: "failed to create event source".to_string(),
            },
        )?;
        let event = CGEvent::new(source).map_err(|_| PlacementError::CursorUnavailable {
            message: "failed to read pointer event".to_string(),
        })?;
        let location = event.location();
        Ok(Point {
            x: location.x as i32,
            y: location.y as i32,
        })
    }
}

#[cfg(not(target_os = "macos"))]
impl MonitorProvider for SystemMonitors {
    fn monitors(&self) -> Result<Vec<Monitor>, PlacementError> {
        Err(PlacementError::MonitorUnavailable {
            message: "monitor enumeration not supported on this platform".to_string(),
        })
    }

    fn cursor_position(&self) -> Result<Point, PlacementError> {
        Err(PlacementError::CursorUnavailable {
            message: "pointer location not supported on this platform".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed monitor layout for provider default-method tests.
    struct FixedMonitors(Vec<Monitor>);

    impl MonitorProvider for FixedMonitors {
        fn monitors(&self) -> Result<Vec<Monitor>, PlacementError> {
            if self.0.is_empty() {
                return Err(PlacementError::MonitorUnavailable {
                    message: "no monitors".to_string(),
                });
            }
            Ok(self.0.clone())
        }

        fn cursor_position(&self) -> Result<Point, PlacementError> {
            Err(PlacementError::CursorUnavailable {
                message: "fixed layout has no pointer".to_string(),
            })
        }
    }

    fn dual_layout() -> FixedMonitors {
        FixedMonitors(vec![
            Monitor {
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                is_primary: true,
            },
            Monitor {
                x: 1920,
                y: 0,
                width: 2560,
                height: 1440,
                is_primary: false,
            },
        ])
    }

    #[test]
    fn test_primary_prefers_flag() {
        let provider = dual_layout();
        let primary = provider.primary().unwrap();
        assert_eq!(primary.width, 1920);
        assert!(primary.is_primary);
    }

    #[test]
    fn test_primary_falls_back_to_first() {
        let provider = FixedMonitors(vec![Monitor {
            x: 0,
            y: 0,
            width: 1280,
            height: 720,
            is_primary: false,
        }]);
        assert_eq!(provider.primary().unwrap().width, 1280);
    }

    #[test]
    fn test_nearest_containing_monitor_wins() {
        let provider = dual_layout();
        let m = provider.nearest(Point { x: 2000, y: 500 }).unwrap();
        assert_eq!(m.x, 1920);
    }

    #[test]
    fn test_nearest_by_distance_when_outside_all() {
        let provider = dual_layout();
        // Far left of the primary monitor.
        let m = provider.nearest(Point { x: -500, y: 500 }).unwrap();
        assert_eq!(m.x, 0);
        // Far right of the secondary monitor.
        let m = provider.nearest(Point { x: 9000, y: 500 }).unwrap();
        assert_eq!(m.x, 1920);
    }

    #[test]
    fn test_empty_layout_errors() {
        let provider = FixedMonitors(vec![]);
        assert!(provider.primary().is_err());
        assert!(provider.nearest(Point { x: 0, y: 0 }).is_err());
    }
}
