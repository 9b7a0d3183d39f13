use crate::types::{MazeDescription, Vec2, WallSegment};

/// Anything a point-like player can collide with.
pub trait CollisionWorld {
    fn is_blocked(&self, position: Vec2, radius: f32) -> bool;
}

/// True when `position` lies strictly inside some wall inflated by `radius`.
/// Points exactly on an inflated edge are free.
pub fn is_blocked(position: Vec2, walls: &[WallSegment], radius: f32) -> bool {
    walls
        .iter()
        .any(|wall| wall.inflated_bounds(radius).contains(position))
}

impl CollisionWorld for [WallSegment] {
    fn is_blocked(&self, position: Vec2, radius: f32) -> bool {
        is_blocked(position, self, radius)
    }
}

impl CollisionWorld for Vec<WallSegment> {
    fn is_blocked(&self, position: Vec2, radius: f32) -> bool {
        is_blocked(position, self, radius)
    }
}

/// Uniform grid over the maze's cells. Each bucket lists the walls whose
/// inflated box can reach into that cell, so a query only tests a handful
/// of segments instead of the whole maze.
#[derive(Clone, Debug)]
pub struct WallIndex {
    walls: Vec<WallSegment>,
    origin: Vec2,
    bucket_size: f32,
    columns: usize,
    rows: usize,
    /// Radius the buckets were built for. Larger queries fall back to a scan.
    max_radius: f32,
    buckets: Vec<Vec<usize>>,
}

impl WallIndex {
    pub fn build(maze: &MazeDescription, max_radius: f32) -> Self {
        // One cell of slack on every side so exit-corridor walls and the
        // win zone stay inside the indexed area.
        let columns = maze.width as usize + 2;
        let rows = maze.height as usize + 2;
        let base = maze.origin();
        let origin = Vec2::new(base.x - maze.cell_size, base.z - maze.cell_size);
        let mut index = Self {
            walls: maze.walls.clone(),
            origin,
            bucket_size: maze.cell_size,
            columns,
            rows,
            max_radius: max_radius.max(0.0),
            buckets: vec![Vec::new(); columns * rows],
        };

        for (wall_id, wall) in maze.walls.iter().enumerate() {
            let bounds = wall.inflated_bounds(index.max_radius);
            let (min_col, min_row) = index.clamped_bucket(Vec2::new(bounds.min_x, bounds.min_z));
            let (max_col, max_row) = index.clamped_bucket(Vec2::new(bounds.max_x, bounds.max_z));
            for row in min_row..=max_row {
                for col in min_col..=max_col {
                    index.buckets[row * index.columns + col].push(wall_id);
                }
            }
        }
        index
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    fn bucket_of(&self, position: Vec2) -> Option<(usize, usize)> {
        let col = ((position.x - self.origin.x) / self.bucket_size).floor();
        let row = ((position.z - self.origin.z) / self.bucket_size).floor();
        if !(col >= 0.0 && row >= 0.0 && col < self.columns as f32 && row < self.rows as f32) {
            return None;
        }
        Some((col as usize, row as usize))
    }

    fn clamped_bucket(&self, position: Vec2) -> (usize, usize) {
        let col = ((position.x - self.origin.x) / self.bucket_size).floor();
        let row = ((position.z - self.origin.z) / self.bucket_size).floor();
        (
            col.clamp(0.0, (self.columns - 1) as f32) as usize,
            row.clamp(0.0, (self.rows - 1) as f32) as usize,
        )
    }
}

impl CollisionWorld for WallIndex {
    fn is_blocked(&self, position: Vec2, radius: f32) -> bool {
        if radius > self.max_radius {
            return is_blocked(position, &self.walls, radius);
        }
        match self.bucket_of(position) {
            Some((col, row)) => self.buckets[row * self.columns + col]
                .iter()
                .any(|&wall_id| self.walls[wall_id].inflated_bounds(radius).contains(position)),
            None => is_blocked(position, &self.walls, radius),
        }
    }
}
