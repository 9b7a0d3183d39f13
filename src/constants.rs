use crate::types::Difficulty;

pub const TICK_RATE: u32 = 60;
pub const TICK_SECONDS: f32 = 1.0 / TICK_RATE as f32;

pub const DEFAULT_CELL_SIZE: f32 = 2.0;
pub const WALL_THICKNESS: f32 = 0.3;

pub const COLLISION_RADIUS: f32 = 0.1;
pub const MOVE_SPEED: f32 = 3.0;
pub const TURN_SPEED: f32 = 2.0;
pub const INITIAL_HEADING: f32 = 0.0;

/// Distance past the win zone's inner edge, in cells, the player must travel
/// before the exit counts. Half a cell is one world unit at the default size.
pub const WIN_MARGIN_PER_CELL: f32 = 0.5;

/// Longest frame the session will simulate; anything longer is clamped.
pub const MAX_FRAME_SECONDS: f32 = 0.25;
/// Longest single collision step. Longer frames are split into substeps.
pub const MAX_STEP_SECONDS: f32 = 1.0 / TICK_RATE as f32;

pub fn get_grid_size(difficulty: Difficulty) -> (u32, u32) {
    match difficulty {
        Difficulty::Easy => (10, 10),
        Difficulty::Intermediate => (15, 10),
        Difficulty::Hard => (20, 15),
        Difficulty::Extreme => (35, 20),
    }
}

pub fn get_win_margin(cell_size: f32) -> f32 {
    cell_size * WIN_MARGIN_PER_CELL
}
