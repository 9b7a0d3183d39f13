use std::ops::{Add, Mul, Neg};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Intermediate,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "intermediate" => Some(Self::Intermediate),
            "hard" => Some(Self::Hard),
            "extreme" => Some(Self::Extreme),
            _ => None,
        }
    }
}

/// Position on the ground plane. `y` is cosmetic and lives in the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub z: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, z: 0.0 };

    pub fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.z * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WallOrientation {
    /// Runs along x; one cell wide, one wall thick in z.
    Horizontal,
    /// Runs along z.
    Vertical,
}

/// Axis-aligned wall box, centered at `(x, z)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WallSegment {
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
}

impl WallSegment {
    pub fn orientation(&self) -> WallOrientation {
        if self.depth < self.width {
            WallOrientation::Horizontal
        } else {
            WallOrientation::Vertical
        }
    }

    pub fn inflated_bounds(&self, radius: f32) -> Bounds {
        Bounds {
            min_x: self.x - self.width / 2.0 - radius,
            max_x: self.x + self.width / 2.0 + radius,
            min_z: self.z - self.depth / 2.0 - radius,
            max_z: self.z + self.depth / 2.0 + radius,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bounds {
    #[serde(rename = "minX")]
    pub min_x: f32,
    #[serde(rename = "maxX")]
    pub max_x: f32,
    #[serde(rename = "minZ")]
    pub min_z: f32,
    #[serde(rename = "maxZ")]
    pub max_z: f32,
}

impl Bounds {
    /// Open-interval test: points on an edge are outside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x > self.min_x && point.x < self.max_x && point.z > self.min_z && point.z < self.max_z
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Zone {
    pub x: f32,
    pub z: f32,
    pub bounds: Bounds,
}

impl Zone {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// Immutable result of one maze generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MazeDescription {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "cellSize")]
    pub cell_size: f32,
    #[serde(rename = "wallThickness")]
    pub wall_thickness: f32,
    pub walls: Vec<WallSegment>,
    #[serde(rename = "startZone")]
    pub start_zone: Zone,
    #[serde(rename = "winZone")]
    pub win_zone: Zone,
}

impl MazeDescription {
    /// World-space corner of cell `(0, 0)`. The maze is centered on the origin.
    pub fn origin(&self) -> Vec2 {
        Vec2::new(
            -(self.width as f32) * self.cell_size / 2.0,
            -(self.height as f32) * self.cell_size / 2.0,
        )
    }
}

/// Movement directions asserted for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MoveIntent {
    #[serde(rename = "moveForward")]
    pub move_forward: bool,
    #[serde(rename = "moveBackward")]
    pub move_backward: bool,
    #[serde(rename = "turnLeft")]
    pub turn_left: bool,
    #[serde(rename = "turnRight")]
    pub turn_right: bool,
    #[serde(rename = "strafeLeft")]
    pub strafe_left: bool,
    #[serde(rename = "strafeRight")]
    pub strafe_right: bool,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TickOutcome {
    pub position: Vec2,
    pub rotation: f32,
    #[serde(rename = "justWon")]
    pub just_won: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPhase {
    Idle,
    Active,
    Won,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MazeGenerated {
        width: u32,
        height: u32,
        seed: u32,
        #[serde(rename = "wallCount")]
        wall_count: usize,
    },
    SessionStarted {
        position: Vec2,
    },
    FrameClamped {
        #[serde(rename = "requestedSeconds")]
        requested_seconds: f32,
        #[serde(rename = "appliedSeconds")]
        applied_seconds: f32,
    },
    PlayerWon {
        #[serde(rename = "elapsedMs")]
        elapsed_ms: u64,
    },
    PlayerReset,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub phase: NavigationPhase,
    pub position: Vec2,
    pub rotation: f32,
    #[serde(rename = "hasWon")]
    pub has_won: bool,
    pub cell: Option<(u32, u32)>,
    pub events: Vec<SessionEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionSummary {
    pub width: u32,
    pub height: u32,
    #[serde(rename = "cellSize")]
    pub cell_size: f32,
    pub seed: u32,
    pub ticks: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub won: bool,
    #[serde(rename = "wonAtMs")]
    pub won_at_ms: Option<u64>,
    pub retries: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("intermediate"), Some(Difficulty::Intermediate));
        assert_eq!(Difficulty::parse("extreme"), Some(Difficulty::Extreme));
        assert_eq!(Difficulty::parse("nightmare"), None);
    }

    #[test]
    fn wall_orientation_follows_the_thin_axis() {
        let horizontal = WallSegment {
            x: 0.0,
            z: 0.0,
            width: 2.0,
            depth: 0.3,
        };
        let vertical = WallSegment {
            x: 0.0,
            z: 0.0,
            width: 0.3,
            depth: 2.0,
        };
        assert_eq!(horizontal.orientation(), WallOrientation::Horizontal);
        assert_eq!(vertical.orientation(), WallOrientation::Vertical);
    }

    #[test]
    fn bounds_exclude_their_edges() {
        let bounds = Bounds {
            min_x: 0.0,
            max_x: 1.0,
            min_z: 0.0,
            max_z: 1.0,
        };
        assert!(bounds.contains(Vec2::new(0.5, 0.5)));
        assert!(!bounds.contains(Vec2::new(0.0, 0.5)));
        assert!(!bounds.contains(Vec2::new(0.5, 1.0)));
    }

    #[test]
    fn zone_serializes_with_camel_case_bounds() {
        let zone = Zone {
            x: 1.0,
            z: 2.0,
            bounds: Bounds {
                min_x: 0.0,
                max_x: 2.0,
                min_z: 1.0,
                max_z: 3.0,
            },
        };
        let json = serde_json::to_value(zone).expect("zone should serialize");
        assert_eq!(json["bounds"]["minX"], 0.0);
        assert_eq!(json["bounds"]["maxZ"], 3.0);
    }

    #[test]
    fn session_events_are_tagged() {
        let json = serde_json::to_value(SessionEvent::PlayerWon { elapsed_ms: 1500 })
            .expect("event should serialize");
        assert_eq!(json["type"], "player_won");
        assert_eq!(json["elapsedMs"], 1500);
    }
}
