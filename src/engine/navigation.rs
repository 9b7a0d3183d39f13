use serde::Serialize;

use crate::collision::CollisionWorld;
use crate::constants::{
    get_win_margin, COLLISION_RADIUS, DEFAULT_CELL_SIZE, INITIAL_HEADING, MOVE_SPEED, TURN_SPEED,
};
use crate::types::{MoveIntent, NavigationPhase, TickOutcome, Vec2, Zone};

use super::utils::{axis, forward_vector, right_vector};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavigationConfig {
    pub move_speed: f32,
    pub turn_speed: f32,
    pub collision_radius: f32,
    /// How far past the win zone's inner edge the player must be.
    pub win_margin: f32,
}

impl NavigationConfig {
    pub fn for_cell_size(cell_size: f32) -> Self {
        Self {
            move_speed: MOVE_SPEED,
            turn_speed: TURN_SPEED,
            collision_radius: COLLISION_RADIUS,
            win_margin: get_win_margin(cell_size),
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self::for_cell_size(DEFAULT_CELL_SIZE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlayerState {
    pub position: Vec2,
    pub rotation: f32,
    #[serde(rename = "hasWon")]
    pub has_won: bool,
}

pub fn win_condition_met(position: Vec2, win_zone: &Zone, win_margin: f32) -> bool {
    win_zone.bounds.contains(position) && position.x > win_zone.bounds.min_x + win_margin
}

/// Player kinematics: integrates intent over time against a wall set and
/// latches the win flag. Heading is driven by the turn inputs only.
#[derive(Clone, Debug)]
pub struct NavigationController {
    config: NavigationConfig,
    player: PlayerState,
    started: bool,
}

impl NavigationController {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            player: PlayerState {
                position: Vec2::ZERO,
                rotation: INITIAL_HEADING,
                has_won: false,
            },
            started: false,
        }
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn phase(&self) -> NavigationPhase {
        if !self.started {
            NavigationPhase::Idle
        } else if self.player.has_won {
            NavigationPhase::Won
        } else {
            NavigationPhase::Active
        }
    }

    pub fn start(&mut self, start_zone: &Zone) {
        self.reset(start_zone);
    }

    /// Puts the player back on the start zone facing the initial heading
    /// with the win latch cleared. Input state is not touched.
    pub fn reset(&mut self, start_zone: &Zone) {
        self.player = PlayerState {
            position: start_zone.center(),
            rotation: INITIAL_HEADING,
            has_won: false,
        };
        self.started = true;
    }

    pub fn stop(&mut self) {
        self.started = false;
    }

    /// Advances one tick. `delta_seconds` is trusted as given; callers that
    /// may see long frames should clamp or substep before calling.
    pub fn tick<W: CollisionWorld + ?Sized>(
        &mut self,
        intent: &MoveIntent,
        delta_seconds: f32,
        walls: &W,
        win_zone: &Zone,
    ) -> TickOutcome {
        if !self.started || self.player.has_won {
            return self.outcome(false);
        }

        // The win check looks at where the player already is, before moving.
        if win_condition_met(self.player.position, win_zone, self.config.win_margin) {
            self.player.has_won = true;
            return self.outcome(true);
        }

        let forward = forward_vector(self.player.rotation);
        let right = right_vector(self.player.rotation);

        let turn = axis(intent.turn_left, intent.turn_right);
        self.player.rotation += self.config.turn_speed * delta_seconds * turn;

        let step = self.config.move_speed * delta_seconds;
        let advance = axis(intent.move_forward, intent.move_backward);
        let strafe = axis(intent.strafe_right, intent.strafe_left);
        if advance == 0.0 && strafe == 0.0 {
            return self.outcome(false);
        }

        let displacement = forward * (advance * step) + right * (strafe * step);
        let candidate = self.player.position + displacement;
        // A blocked move is dropped whole; there is no sliding along walls.
        if !walls.is_blocked(candidate, self.config.collision_radius) {
            self.player.position = candidate;
        }

        self.outcome(false)
    }

    fn outcome(&self, just_won: bool) -> TickOutcome {
        TickOutcome {
            position: self.player.position,
            rotation: self.player.rotation,
            just_won,
        }
    }
}
