use std::collections::VecDeque;

use thiserror::Error;

use crate::constants::{get_grid_size, DEFAULT_CELL_SIZE, WALL_THICKNESS};
use crate::rng::RandomSource;
use crate::types::{Bounds, Difficulty, MazeDescription, Vec2, WallOrientation, WallSegment, Zone};

#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum MazeConfigError {
    #[error("maze width must be at least one cell")]
    ZeroWidth,
    #[error("maze height must be at least one cell")]
    ZeroHeight,
    #[error("cell size must be a finite positive number, got {0}")]
    InvalidCellSize(f32),
    #[error("cell size {cell_size} must be larger than the wall thickness {wall_thickness}")]
    CellSizeBelowWallThickness { cell_size: f32, wall_thickness: f32 },
}

/// Validated generator input. Only constructible through [`MazeConfig::new`]
/// or the difficulty presets, so generation never sees a degenerate grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MazeConfig {
    width: u32,
    height: u32,
    cell_size: f32,
}

impl MazeConfig {
    pub fn new(width: u32, height: u32, cell_size: f32) -> Result<Self, MazeConfigError> {
        if width == 0 {
            return Err(MazeConfigError::ZeroWidth);
        }
        if height == 0 {
            return Err(MazeConfigError::ZeroHeight);
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(MazeConfigError::InvalidCellSize(cell_size));
        }
        if cell_size <= WALL_THICKNESS {
            return Err(MazeConfigError::CellSizeBelowWallThickness {
                cell_size,
                wall_thickness: WALL_THICKNESS,
            });
        }
        Ok(Self {
            width,
            height,
            cell_size,
        })
    }

    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let (width, height) = get_grid_size(difficulty);
        Self {
            width,
            height,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    fn neighbor(self, x: u32, z: u32, width: u32, height: u32) -> Option<(u32, u32)> {
        match self {
            Side::Top if z > 0 => Some((x, z - 1)),
            Side::Right if x + 1 < width => Some((x + 1, z)),
            Side::Bottom if z + 1 < height => Some((x, z + 1)),
            Side::Left if x > 0 => Some((x - 1, z)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellWalls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl CellWalls {
    pub const CLOSED: Self = Self {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };
    pub const OPEN: Self = Self {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    pub fn has(&self, side: Side) -> bool {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }

    pub fn set(&mut self, side: Side, present: bool) {
        match side {
            Side::Top => self.top = present,
            Side::Right => self.right = present,
            Side::Bottom => self.bottom = present,
            Side::Left => self.left = present,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub x: u32,
    pub z: u32,
    pub walls: CellWalls,
    pub visited: bool,
}

#[derive(Clone, Debug)]
pub struct CellGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    removed_walls: usize,
}

impl CellGrid {
    fn filled(width: u32, height: u32, walls: CellWalls) -> Self {
        let cells = (0..height)
            .flat_map(|z| {
                (0..width).map(move |x| Cell {
                    x,
                    z,
                    walls,
                    visited: false,
                })
            })
            .collect();
        Self {
            width,
            height,
            cells,
            removed_walls: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Interior walls opened between neighbouring cells. The exit opening
    /// is on the outer boundary and is not counted.
    pub fn removed_walls(&self) -> usize {
        self.removed_walls
    }

    pub fn cell(&self, x: u32, z: u32) -> &Cell {
        &self.cells[self.index(x, z)]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    fn cell_mut(&mut self, x: u32, z: u32) -> &mut Cell {
        let index = self.index(x, z);
        &mut self.cells[index]
    }

    fn index(&self, x: u32, z: u32) -> usize {
        (z * self.width + x) as usize
    }

    /// Clears the wall on `side` of `(x, z)` and the matching wall of the
    /// neighbour behind it, if any.
    fn remove_wall(&mut self, x: u32, z: u32, side: Side) {
        self.cell_mut(x, z).walls.set(side, false);
        if let Some((nx, nz)) = side.neighbor(x, z, self.width, self.height) {
            self.cell_mut(nx, nz).walls.set(side.opposite(), false);
        }
    }

    /// Neighbours reachable from `(x, z)` without crossing a wall.
    pub fn open_neighbors(&self, x: u32, z: u32) -> Vec<(u32, u32)> {
        let walls = self.cell(x, z).walls;
        Side::ALL
            .into_iter()
            .filter(|side| !walls.has(*side))
            .filter_map(|side| side.neighbor(x, z, self.width, self.height))
            .collect()
    }

    /// Breadth-first count of cells reachable from `(0, 0)`.
    pub fn reachable_cells(&self) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([(0u32, 0u32)]);
        seen[0] = true;
        let mut count = 0;
        while let Some((x, z)) = queue.pop_front() {
            count += 1;
            for (nx, nz) in self.open_neighbors(x, z) {
                let index = self.index(nx, nz);
                if !seen[index] {
                    seen[index] = true;
                    queue.push_back((nx, nz));
                }
            }
        }
        count
    }

    fn count_open_interior_edges(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                let right = cell.x + 1 < self.width && !cell.walls.right;
                let bottom = cell.z + 1 < self.height && !cell.walls.bottom;
                right as usize + bottom as usize
            })
            .sum()
    }
}

/// Randomized depth-first carve from the top-left cell. Every cell ends up
/// visited and exactly `width * height - 1` interior walls are removed.
pub fn carve_passages<R: RandomSource + ?Sized>(width: u32, height: u32, rng: &mut R) -> CellGrid {
    let mut grid = CellGrid::filled(width, height, CellWalls::CLOSED);
    if grid.cells.is_empty() {
        return grid;
    }

    let mut stack = vec![(0u32, 0u32)];
    grid.cell_mut(0, 0).visited = true;
    let mut candidates = Vec::with_capacity(4);

    while let Some(&(x, z)) = stack.last() {
        candidates.clear();
        for side in Side::ALL {
            if let Some((nx, nz)) = side.neighbor(x, z, width, height) {
                if !grid.cell(nx, nz).visited {
                    candidates.push((side, nx, nz));
                }
            }
        }

        if candidates.is_empty() {
            stack.pop();
            continue;
        }

        let (side, nx, nz) = candidates[rng.pick_index(candidates.len())];
        grid.remove_wall(x, z, side);
        grid.removed_walls += 1;
        grid.cell_mut(nx, nz).visited = true;
        stack.push((nx, nz));
    }

    grid
}

pub fn generate_maze<R: RandomSource + ?Sized>(config: &MazeConfig, rng: &mut R) -> MazeDescription {
    let mut grid = carve_passages(config.width, config.height, rng);
    open_exit(&mut grid);
    describe_grid(&grid, config.cell_size)
}

fn open_exit(grid: &mut CellGrid) {
    let (x, z) = (grid.width - 1, grid.height - 1);
    grid.cell_mut(x, z).walls.right = false;
}

fn describe_grid(grid: &CellGrid, cell_size: f32) -> MazeDescription {
    let width = grid.width;
    let height = grid.height;
    let base_x = -(width as f32) * cell_size / 2.0;
    let base_z = -(height as f32) * cell_size / 2.0;
    let half = cell_size / 2.0;

    let mut walls = Vec::new();
    for cell in grid.cells() {
        let world_x = base_x + cell.x as f32 * cell_size;
        let world_z = base_z + cell.z as f32 * cell_size;

        // Shared edges are emitted once, from the cell above or to the left.
        if cell.walls.top {
            walls.push(horizontal_wall(world_x + half, world_z, cell_size));
        }
        if cell.walls.right {
            walls.push(vertical_wall(world_x + cell_size, world_z + half, cell_size));
        }
        if cell.walls.bottom && cell.z == height - 1 {
            walls.push(horizontal_wall(world_x + half, world_z + cell_size, cell_size));
        }
        if cell.walls.left && cell.x == 0 {
            walls.push(vertical_wall(world_x, world_z + half, cell_size));
        }
    }

    let start_zone = Zone {
        x: base_x + half,
        z: base_z + half,
        bounds: Bounds {
            min_x: base_x,
            max_x: base_x + cell_size,
            min_z: base_z,
            max_z: base_z + cell_size,
        },
    };

    // Reaches past the right edge so the player has to leave the grid.
    let win_zone = Zone {
        x: base_x + width as f32 * cell_size + half,
        z: base_z + (height as f32 - 0.5) * cell_size,
        bounds: Bounds {
            min_x: base_x + (width as f32 - 0.5) * cell_size,
            max_x: base_x + (width + 1) as f32 * cell_size,
            min_z: base_z + (height - 1) as f32 * cell_size - cell_size / 4.0,
            max_z: base_z + height as f32 * cell_size + cell_size / 4.0,
        },
    };

    MazeDescription {
        width,
        height,
        cell_size,
        wall_thickness: WALL_THICKNESS,
        walls,
        start_zone,
        win_zone,
    }
}

fn horizontal_wall(x: f32, z: f32, cell_size: f32) -> WallSegment {
    WallSegment {
        x,
        z,
        width: cell_size,
        depth: WALL_THICKNESS,
    }
}

fn vertical_wall(x: f32, z: f32, cell_size: f32) -> WallSegment {
    WallSegment {
        x,
        z,
        width: WALL_THICKNESS,
        depth: cell_size,
    }
}

/// Rebuilds per-cell wall flags from a maze's segment list, the way an
/// overhead map has to when it only receives the renderer's wall data.
pub fn reconstruct_cells(maze: &MazeDescription) -> CellGrid {
    let mut grid = CellGrid::filled(maze.width, maze.height, CellWalls::OPEN);
    let origin = maze.origin();
    let cell_size = maze.cell_size;
    let width = maze.width as f32;
    let height = maze.height as f32;

    for wall in &maze.walls {
        let gx = (wall.x - origin.x) / cell_size;
        let gz = (wall.z - origin.z) / cell_size;
        match wall.orientation() {
            WallOrientation::Horizontal => {
                let column = gx.floor();
                let line = gz.round();
                if column < 0.0 || column >= width || line < 0.0 || line > height {
                    continue;
                }
                let (column, line) = (column as u32, line as u32);
                if line < maze.height {
                    grid.cell_mut(column, line).walls.top = true;
                }
                if line > 0 {
                    grid.cell_mut(column, line - 1).walls.bottom = true;
                }
            }
            WallOrientation::Vertical => {
                let row = gz.floor();
                let line = gx.round();
                if row < 0.0 || row >= height || line < 0.0 || line > width {
                    continue;
                }
                let (row, line) = (row as u32, line as u32);
                if line < maze.width {
                    grid.cell_mut(line, row).walls.left = true;
                }
                if line > 0 {
                    grid.cell_mut(line - 1, row).walls.right = true;
                }
            }
        }
    }

    grid.removed_walls = grid.count_open_interior_edges();
    grid
}

/// Grid cell containing `position`, or `None` outside the maze.
pub fn cell_at(maze: &MazeDescription, position: Vec2) -> Option<(u32, u32)> {
    let origin = maze.origin();
    let gx = ((position.x - origin.x) / maze.cell_size).floor();
    let gz = ((position.z - origin.z) / maze.cell_size).floor();
    if gx < 0.0 || gz < 0.0 || gx >= maze.width as f32 || gz >= maze.height as f32 {
        return None;
    }
    Some((gx as u32, gz as u32))
}

/// Text rendering of the maze: `#` walls, `S` start, `E` the exit opening,
/// `@` the player's cell when given.
pub fn render_ascii(maze: &MazeDescription, player: Option<Vec2>) -> String {
    let grid = reconstruct_cells(maze);
    let columns = (maze.width * 2 + 1) as usize;
    let rows = (maze.height * 2 + 1) as usize;
    let mut canvas = vec![vec![' '; columns]; rows];

    for (r, line) in canvas.iter_mut().enumerate() {
        for (c, slot) in line.iter_mut().enumerate() {
            let wall = match (r % 2, c % 2) {
                (0, 0) => true,
                (0, _) => {
                    let k = (r / 2) as u32;
                    let x = (c / 2) as u32;
                    (k < grid.height && grid.cell(x, k).walls.top)
                        || (k > 0 && grid.cell(x, k - 1).walls.bottom)
                }
                (_, 0) => {
                    let k = (c / 2) as u32;
                    let z = (r / 2) as u32;
                    (k < grid.width && grid.cell(k, z).walls.left)
                        || (k > 0 && grid.cell(k - 1, z).walls.right)
                }
                _ => false,
            };
            if wall {
                *slot = '#';
            }
        }
    }

    if let Some((x, z)) = cell_at(maze, maze.start_zone.center()) {
        canvas[(z * 2 + 1) as usize][(x * 2 + 1) as usize] = 'S';
    }
    let exit_row = ((maze.height - 1) * 2 + 1) as usize;
    if canvas[exit_row][columns - 1] == ' ' {
        canvas[exit_row][columns - 1] = 'E';
    }
    if let Some((x, z)) = player.and_then(|position| cell_at(maze, position)) {
        canvas[(z * 2 + 1) as usize][(x * 2 + 1) as usize] = '@';
    }

    canvas
        .into_iter()
        .map(|line| line.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
