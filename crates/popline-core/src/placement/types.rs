use serde::{Deserialize, Serialize};

/// Named algorithm used to choose popup screen coordinates.
///
/// Selected by configuration, never inferred. Kebab-case wire form matches
/// the settings file (`active-text-field` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    Center,
    ActiveWindowCenter,
    ActiveTextField,
    Cursor,
}

impl PlacementStrategy {
    /// Strategies whose reference point moves with user focus; these are
    /// recomputed even when the popup window is reused.
    pub fn is_reference_sensitive(&self) -> bool {
        !matches!(self, PlacementStrategy::Center)
    }
}

impl std::fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementStrategy::Center => write!(f, "center"),
            PlacementStrategy::ActiveWindowCenter => write!(f, "active-window-center"),
            PlacementStrategy::ActiveTextField => write!(f, "active-text-field"),
            PlacementStrategy::Cursor => write!(f, "cursor"),
        }
    }
}

impl std::str::FromStr for PlacementStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(PlacementStrategy::Center),
            "active-window-center" => Ok(PlacementStrategy::ActiveWindowCenter),
            "active-text-field" => Ok(PlacementStrategy::ActiveTextField),
            "cursor" => Ok(PlacementStrategy::Cursor),
            _ => Err(format!(
                "Invalid placement strategy '{}'. Supported: center, active-window-center, active-text-field, cursor",
                s
            )),
        }
    }
}

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Top-left corner for the popup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// Popup dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopupSize {
    pub width: u32,
    pub height: u32,
}

/// A physical monitor's bounds in the virtual screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Monitor {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl Monitor {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width as i32
            && point.y >= self.y
            && point.y < self.y + self.height as i32
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width as i32 / 2,
            y: self.y + self.height as i32 / 2,
        }
    }

    /// Squared distance from a point to this monitor's rectangle
    /// (zero when the point is inside).
    pub fn distance_squared_to(&self, point: Point) -> i64 {
        let dx = if point.x < self.x {
            (self.x - point.x) as i64
        } else if point.x >= self.x + self.width as i32 {
            (point.x - (self.x + self.width as i32 - 1)) as i64
        } else {
            0
        };
        let dy = if point.y < self.y {
            (self.y - point.y) as i64
        } else if point.y >= self.y + self.height as i32 {
            (point.y - (self.y + self.height as i32 - 1)) as i64
        } else {
            0
        };
        dx * dx + dy * dy
    }

    /// Clamp a popup rectangle so it lies fully inside this monitor.
    ///
    /// When the popup is larger than the monitor the top/left edge wins,
    /// matching `max(min_edge, min(pos, max_edge))` ordering.
    pub fn clamp(&self, position: Position, size: PopupSize) -> Position {
        let max_x = self.x + self.width as i32 - size.width as i32;
        let max_y = self.y + self.height as i32 - size.height as i32;
        Position {
            x: position.x.min(max_x).max(self.x),
            y: position.y.min(max_y).max(self.y),
        }
    }
}
