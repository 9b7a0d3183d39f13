use crate::collision::WallIndex;
use crate::constants::{MAX_FRAME_SECONDS, MAX_STEP_SECONDS};
use crate::maze::{cell_at, generate_maze, MazeConfig};
use crate::rng::Rng;
use crate::types::{
    MazeDescription, MoveIntent, NavigationPhase, SessionEvent, SessionSummary, Snapshot,
    TickOutcome,
};

mod navigation;
mod utils;

pub use self::navigation::{
    win_condition_met, NavigationConfig, NavigationController, PlayerState,
};

use self::utils::seconds_to_ms;

#[derive(Clone, Copy, Debug)]
pub struct GameSessionOptions {
    pub max_frame_seconds: f32,
    pub max_step_seconds: f32,
    /// Overrides the kinematics derived from the maze's cell size.
    pub navigation: Option<NavigationConfig>,
}

impl Default for GameSessionOptions {
    fn default() -> Self {
        Self {
            max_frame_seconds: MAX_FRAME_SECONDS,
            max_step_seconds: MAX_STEP_SECONDS,
            navigation: None,
        }
    }
}

/// One player in one maze. Owns the maze for as long as it is played, so
/// walls and zones can never come from two different generations.
#[derive(Clone, Debug)]
pub struct GameSession {
    maze: MazeDescription,
    walls: WallIndex,
    navigator: NavigationController,
    options: GameSessionOptions,
    seed: u32,

    events: Vec<SessionEvent>,
    tick_counter: u64,
    elapsed_seconds: f64,
    won_at_ms: Option<u64>,
    retries: u32,
}

impl GameSession {
    pub fn new(config: &MazeConfig, seed: u32, options: GameSessionOptions) -> Self {
        let maze = generate_maze(config, &mut Rng::new(seed));
        Self::from_maze(maze, seed, options)
    }

    pub fn from_maze(maze: MazeDescription, seed: u32, options: GameSessionOptions) -> Self {
        let navigation = options
            .navigation
            .unwrap_or_else(|| NavigationConfig::for_cell_size(maze.cell_size));
        let walls = WallIndex::build(&maze, navigation.collision_radius);
        let mut session = Self {
            maze,
            walls,
            navigator: NavigationController::new(navigation),
            options,
            seed,
            events: Vec::new(),
            tick_counter: 0,
            elapsed_seconds: 0.0,
            won_at_ms: None,
            retries: 0,
        };
        session.begin();
        session
    }

    pub fn maze(&self) -> &MazeDescription {
        &self.maze
    }

    pub fn player(&self) -> &PlayerState {
        self.navigator.player()
    }

    pub fn phase(&self) -> NavigationPhase {
        self.navigator.phase()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulates one rendered frame. Frames that are not finite and positive
    /// are ignored, long frames are clamped, and the remainder is split into
    /// substeps short enough that the player cannot pass through a wall.
    pub fn step(&mut self, intent: &MoveIntent, frame_seconds: f32) -> TickOutcome {
        let player = *self.navigator.player();
        let idle = TickOutcome {
            position: player.position,
            rotation: player.rotation,
            just_won: false,
        };
        if !frame_seconds.is_finite() || frame_seconds <= 0.0 {
            return idle;
        }

        let applied = frame_seconds.min(self.options.max_frame_seconds);
        if applied < frame_seconds {
            self.events.push(SessionEvent::FrameClamped {
                requested_seconds: frame_seconds,
                applied_seconds: applied,
            });
        }
        self.tick_counter += 1;
        self.elapsed_seconds += applied as f64;

        let max_step = self.options.max_step_seconds;
        let substeps = if max_step > 0.0 {
            (applied / max_step).ceil().max(1.0) as u32
        } else {
            1
        };
        let delta = applied / substeps as f32;

        let mut outcome = idle;
        for _ in 0..substeps {
            outcome = self
                .navigator
                .tick(intent, delta, &self.walls, &self.maze.win_zone);
            if outcome.just_won {
                let elapsed_ms = seconds_to_ms(self.elapsed_seconds);
                self.won_at_ms = Some(elapsed_ms);
                self.events.push(SessionEvent::PlayerWon { elapsed_ms });
                break;
            }
        }
        outcome
    }

    /// Same maze, back to the start.
    pub fn retry(&mut self) {
        self.navigator.reset(&self.maze.start_zone);
        self.won_at_ms = None;
        self.retries += 1;
        self.events.push(SessionEvent::PlayerReset);
    }

    /// Replaces the maze with a fresh one and restarts the player on it.
    pub fn new_maze(&mut self, config: &MazeConfig, seed: u32) {
        let maze = generate_maze(config, &mut Rng::new(seed));
        let navigation = self
            .options
            .navigation
            .unwrap_or_else(|| NavigationConfig::for_cell_size(maze.cell_size));
        self.walls = WallIndex::build(&maze, navigation.collision_radius);
        self.navigator = NavigationController::new(navigation);
        self.maze = maze;
        self.seed = seed;
        self.tick_counter = 0;
        self.elapsed_seconds = 0.0;
        self.won_at_ms = None;
        self.retries = 0;
        self.begin();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let player = *self.navigator.player();
        let snapshot = Snapshot {
            tick: self.tick_counter,
            elapsed_ms: seconds_to_ms(self.elapsed_seconds),
            phase: self.navigator.phase(),
            position: player.position,
            rotation: player.rotation,
            has_won: player.has_won,
            cell: cell_at(&self.maze, player.position),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> SessionSummary {
        SessionSummary {
            width: self.maze.width,
            height: self.maze.height,
            cell_size: self.maze.cell_size,
            seed: self.seed,
            ticks: self.tick_counter,
            elapsed_ms: seconds_to_ms(self.elapsed_seconds),
            won: self.navigator.player().has_won,
            won_at_ms: self.won_at_ms,
            retries: self.retries,
        }
    }

    fn begin(&mut self) {
        self.events.push(SessionEvent::MazeGenerated {
            width: self.maze.width,
            height: self.maze.height,
            seed: self.seed,
            wall_count: self.maze.walls.len(),
        });
        self.navigator.start(&self.maze.start_zone);
        self.events.push(SessionEvent::SessionStarted {
            position: self.maze.start_zone.center(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use crate::constants::{
        DEFAULT_CELL_SIZE, MAX_FRAME_SECONDS, MOVE_SPEED, TICK_SECONDS, WALL_THICKNESS,
    };
    use crate::engine::{GameSession, GameSessionOptions};
    use crate::maze::{reconstruct_cells, MazeConfig};
    use crate::types::{
        Bounds, MazeDescription, MoveIntent, NavigationPhase, SessionEvent, Vec2, WallSegment,
        Zone,
    };

    fn easy_session(seed: u32) -> GameSession {
        let config = MazeConfig::new(10, 10, DEFAULT_CELL_SIZE).expect("valid config");
        GameSession::new(&config, seed, GameSessionOptions::default())
    }

    fn open_field(walls: Vec<WallSegment>) -> MazeDescription {
        MazeDescription {
            width: 4,
            height: 4,
            cell_size: 2.0,
            wall_thickness: WALL_THICKNESS,
            walls,
            start_zone: Zone {
                x: 0.0,
                z: 0.0,
                bounds: Bounds {
                    min_x: -1.0,
                    max_x: 1.0,
                    min_z: -1.0,
                    max_z: 1.0,
                },
            },
            win_zone: Zone {
                x: 20.0,
                z: 20.0,
                bounds: Bounds {
                    min_x: 19.0,
                    max_x: 21.0,
                    min_z: 19.0,
                    max_z: 21.0,
                },
            },
        }
    }

    fn intent_along(axis_x: bool, from: Vec2, to: Vec2) -> MoveIntent {
        // Heading stays at zero: forward is +z, strafing left is +x.
        if axis_x {
            MoveIntent {
                strafe_left: to.x > from.x,
                strafe_right: to.x < from.x,
                ..MoveIntent::default()
            }
        } else {
            MoveIntent {
                move_forward: to.z > from.z,
                move_backward: to.z < from.z,
                ..MoveIntent::default()
            }
        }
    }

    fn solution_path(session: &GameSession) -> Vec<(u32, u32)> {
        let maze = session.maze();
        let grid = reconstruct_cells(maze);
        let goal = (maze.width - 1, maze.height - 1);
        let mut parent: HashMap<(u32, u32), (u32, u32)> = HashMap::new();
        let mut queue = VecDeque::from([(0u32, 0u32)]);
        parent.insert((0, 0), (0, 0));
        while let Some(cell) = queue.pop_front() {
            if cell == goal {
                break;
            }
            for next in grid.open_neighbors(cell.0, cell.1) {
                if !parent.contains_key(&next) {
                    parent.insert(next, cell);
                    queue.push_back(next);
                }
            }
        }
        let mut path = vec![goal];
        let mut cursor = goal;
        while cursor != (0, 0) {
            cursor = parent[&cursor];
            path.push(cursor);
        }
        path.reverse();
        path
    }

    fn cell_center(maze: &MazeDescription, cell: (u32, u32)) -> Vec2 {
        let origin = maze.origin();
        Vec2::new(
            origin.x + (cell.0 as f32 + 0.5) * maze.cell_size,
            origin.z + (cell.1 as f32 + 0.5) * maze.cell_size,
        )
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let mut a = easy_session(424_242);
        let mut b = easy_session(424_242);
        let intents = [
            MoveIntent {
                move_forward: true,
                ..MoveIntent::default()
            },
            MoveIntent {
                strafe_left: true,
                turn_left: true,
                ..MoveIntent::default()
            },
            MoveIntent {
                move_backward: true,
                turn_right: true,
                ..MoveIntent::default()
            },
        ];
        for tick in 0..600 {
            let intent = intents[(tick / 40) % intents.len()];
            let oa = a.step(&intent, TICK_SECONDS);
            let ob = b.step(&intent, TICK_SECONDS);
            assert_eq!(oa.position.x.to_bits(), ob.position.x.to_bits());
            assert_eq!(oa.position.z.to_bits(), ob.position.z.to_bits());
            assert_eq!(oa.rotation.to_bits(), ob.rotation.to_bits());
        }
        assert_eq!(a.maze(), b.maze());
    }

    #[test]
    fn session_starts_on_the_start_zone_and_reports_it() {
        let mut session = easy_session(1);
        assert_eq!(session.phase(), NavigationPhase::Active);
        assert_eq!(session.player().position, session.maze().start_zone.center());

        let snapshot = session.build_snapshot(true);
        assert_eq!(snapshot.cell, Some((0, 0)));
        assert!(matches!(
            snapshot.events[0],
            SessionEvent::MazeGenerated {
                width: 10,
                height: 10,
                seed: 1,
                wall_count: 120,
            }
        ));
        assert!(matches!(
            snapshot.events[1],
            SessionEvent::SessionStarted { .. }
        ));
        assert!(session.build_snapshot(true).events.is_empty());
    }

    #[test]
    fn events_are_preserved_until_snapshot_drains() {
        let mut session = easy_session(2);
        let peek = session.build_snapshot(false);
        assert!(peek.events.is_empty());
        let drained = session.build_snapshot(true);
        assert_eq!(drained.events.len(), 2);
    }

    #[test]
    fn invalid_frames_are_ignored() {
        let mut session = easy_session(3);
        let forward = MoveIntent {
            move_forward: true,
            ..MoveIntent::default()
        };
        let before = *session.player();
        for frame in [0.0, -0.5, f32::NAN, f32::INFINITY] {
            let outcome = session.step(&forward, frame);
            assert_eq!(outcome.position, before.position);
            assert!(!outcome.just_won);
        }
        assert_eq!(session.tick_count(), 0);
    }

    #[test]
    fn long_frames_are_clamped_and_reported() {
        let mut session =
            GameSession::from_maze(open_field(Vec::new()), 0, GameSessionOptions::default());
        session.build_snapshot(true);
        let forward = MoveIntent {
            move_forward: true,
            ..MoveIntent::default()
        };
        let outcome = session.step(&forward, 3.0);
        let travelled = outcome.position.z;
        assert!((travelled - MOVE_SPEED * MAX_FRAME_SECONDS).abs() < 1e-4);

        let snapshot = session.build_snapshot(true);
        assert_eq!(snapshot.elapsed_ms, 250);
        assert!(matches!(
            snapshot.events.as_slice(),
            [SessionEvent::FrameClamped { requested_seconds, applied_seconds }]
                if *requested_seconds == 3.0 && *applied_seconds == MAX_FRAME_SECONDS
        ));
    }

    #[test]
    fn substeps_keep_long_frames_from_tunneling() {
        let wall = WallSegment {
            x: 0.0,
            z: 0.5,
            width: 4.0,
            depth: WALL_THICKNESS,
        };
        let mut session =
            GameSession::from_maze(open_field(vec![wall]), 0, GameSessionOptions::default());
        let forward = MoveIntent {
            move_forward: true,
            ..MoveIntent::default()
        };
        let outcome = session.step(&forward, 0.3);
        assert!(outcome.position.z <= 0.25 + 1e-4);
        assert!(outcome.position.z > 0.0);
    }

    #[test]
    fn reaching_the_win_zone_fires_once() {
        let config = MazeConfig::new(10, 10, DEFAULT_CELL_SIZE).expect("valid config");
        let mut maze = crate::maze::generate_maze(&config, &mut crate::rng::Rng::new(9));
        maze.start_zone = maze.win_zone;
        let mut session = GameSession::from_maze(maze, 9, GameSessionOptions::default());
        session.build_snapshot(true);

        let first = session.step(&MoveIntent::default(), TICK_SECONDS);
        assert!(first.just_won);
        assert_eq!(session.phase(), NavigationPhase::Won);

        let forward = MoveIntent {
            move_forward: true,
            ..MoveIntent::default()
        };
        for _ in 0..30 {
            let outcome = session.step(&forward, TICK_SECONDS);
            assert!(!outcome.just_won);
            assert_eq!(outcome.position, first.position);
        }

        let snapshot = session.build_snapshot(true);
        let wins = snapshot
            .events
            .iter()
            .filter(|event| matches!(event, SessionEvent::PlayerWon { .. }))
            .count();
        assert_eq!(wins, 1);
        assert!(snapshot.has_won);
        assert_eq!(session.build_summary().won_at_ms, Some(17));
    }

    #[test]
    fn retry_returns_to_start_and_clears_the_win() {
        let config = MazeConfig::new(10, 10, DEFAULT_CELL_SIZE).expect("valid config");
        let maze = crate::maze::generate_maze(&config, &mut crate::rng::Rng::new(5));
        let start = maze.start_zone;
        let mut won_maze = maze.clone();
        won_maze.start_zone = maze.win_zone;
        let mut session = GameSession::from_maze(won_maze, 5, GameSessionOptions::default());
        assert!(session.step(&MoveIntent::default(), TICK_SECONDS).just_won);

        session.retry();
        assert!(!session.player().has_won);
        assert_eq!(session.player().rotation, 0.0);
        assert_eq!(session.build_summary().retries, 1);
        assert_eq!(session.build_summary().won_at_ms, None);

        let mut fresh = GameSession::from_maze(maze, 5, GameSessionOptions::default());
        fresh.step(
            &MoveIntent {
                move_forward: true,
                turn_left: true,
                ..MoveIntent::default()
            },
            TICK_SECONDS,
        );
        fresh.retry();
        assert_eq!(fresh.player().position, start.center());
        assert_eq!(fresh.player().rotation, 0.0);
        assert!(matches!(
            fresh.build_snapshot(true).events.last(),
            Some(SessionEvent::PlayerReset)
        ));
    }

    #[test]
    fn new_maze_replaces_layout_and_restarts() {
        let mut session = easy_session(10);
        session.step(
            &MoveIntent {
                move_forward: true,
                ..MoveIntent::default()
            },
            TICK_SECONDS,
        );
        let hard = MazeConfig::new(20, 15, DEFAULT_CELL_SIZE).expect("valid config");
        session.new_maze(&hard, 11);
        assert_eq!(session.maze().width, 20);
        assert_eq!(session.maze().height, 15);
        assert_eq!(session.seed(), 11);
        assert_eq!(session.tick_count(), 0);
        assert_eq!(session.player().position, session.maze().start_zone.center());
    }

    #[test]
    fn walking_the_solution_path_wins() {
        let mut session = easy_session(2024);
        let path = solution_path(&session);
        let maze = session.maze().clone();
        let mut safety = 0;

        for pair in path.windows(2) {
            let axis_x = pair[0].0 != pair[1].0;
            let target = cell_center(&maze, pair[1]);
            loop {
                let before = session.player().position;
                let remaining = if axis_x {
                    target.x - before.x
                } else {
                    target.z - before.z
                };
                if remaining.abs() < MOVE_SPEED * TICK_SECONDS / 2.0 {
                    break;
                }
                session.step(&intent_along(axis_x, before, target), TICK_SECONDS);
                let after = session.player().position;
                assert_ne!(after, before, "stuck entering {:?}", pair[1]);
                let left = if axis_x {
                    target.x - after.x
                } else {
                    target.z - after.z
                };
                if left * remaining < 0.0 {
                    break;
                }
                safety += 1;
                assert!(safety < 20_000);
            }
        }

        let exit = MoveIntent {
            strafe_left: true,
            ..MoveIntent::default()
        };
        let mut won = false;
        for _ in 0..200 {
            if session.step(&exit, TICK_SECONDS).just_won {
                won = true;
                break;
            }
        }
        assert!(won);
        assert!(session.player().position.x > maze.win_zone.bounds.min_x + 1.0);
    }
}
