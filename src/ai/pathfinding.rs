//! Navigation queries
//!
//! The steering stack consumes raw waypoints from any `NavQuery`. `NavGrid`
//! is a walkable-cell grid on the XZ plane searched with A*, standing in for
//! a navigation mesh in headless setups and tests.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

/// Source of raw waypoint lists
pub trait NavQuery {
    /// Waypoints leading from `from` to `to`, excluding `from`
    ///
    /// Returns an empty list when the goal is unreachable.
    fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3>;
}

/// A walkable-cell grid on the XZ plane
#[derive(Debug, Clone)]
pub struct NavGrid {
    /// Width in cells (along X)
    pub width: usize,
    /// Depth in cells (along Z)
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World XZ position of the grid's minimum corner
    pub origin: Vec2,
    /// Height assigned to returned waypoints
    pub floor_height: f32,
    cells: Vec<bool>,
}

type Cell = (usize, usize);

impl NavGrid {
    /// Create a new grid, all cells walkable
    #[must_use]
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Self {
        Self {
            width,
            depth,
            cell_size,
            origin: Vec2::ZERO,
            floor_height: 0.0,
            cells: vec![true; width * depth],
        }
    }

    /// Place the grid's minimum corner
    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Set the waypoint height
    #[must_use]
    pub fn with_floor_height(mut self, height: f32) -> Self {
        self.floor_height = height;
        self
    }

    /// Set a cell's walkability
    pub fn set_walkable(&mut self, x: usize, z: usize, walkable: bool) {
        if x < self.width && z < self.depth {
            self.cells[z * self.width + x] = walkable;
        }
    }

    /// Mark every cell whose centre lies within `radius` of `center` as blocked
    pub fn block_disc(&mut self, center: Vec3, radius: f32) {
        for z in 0..self.depth {
            for x in 0..self.width {
                let cell = self.cell_center(x, z);
                if cell.distance(Vec2::new(center.x, center.z)) <= radius {
                    self.set_walkable(x, z, false);
                }
            }
        }
    }

    /// Check if a cell is walkable
    #[must_use]
    pub fn is_walkable(&self, x: usize, z: usize) -> bool {
        x < self.width && z < self.depth && self.cells[z * self.width + x]
    }

    /// Cell containing a world position
    #[must_use]
    pub fn world_to_cell(&self, pos: Vec3) -> Option<Cell> {
        let local = Vec2::new(pos.x, pos.z) - self.origin;
        let x = (local.x / self.cell_size).floor();
        let z = (local.y / self.cell_size).floor();
        if x < 0.0 || z < 0.0 {
            return None;
        }
        let cell = (x as usize, z as usize);
        (cell.0 < self.width && cell.1 < self.depth).then_some(cell)
    }

    fn cell_center(&self, x: usize, z: usize) -> Vec2 {
        self.origin
            + Vec2::new(
                (x as f32 + 0.5) * self.cell_size,
                (z as f32 + 0.5) * self.cell_size,
            )
    }

    /// Cell centre as a waypoint
    #[must_use]
    pub fn cell_to_world(&self, x: usize, z: usize) -> Vec3 {
        let center = self.cell_center(x, z);
        Vec3::new(center.x, self.floor_height, center.y)
    }

    fn neighbors(&self, (x, z): Cell) -> impl Iterator<Item = Cell> + '_ {
        let candidates = [
            x.checked_sub(1).map(|x| (x, z)),
            Some((x + 1, z)),
            z.checked_sub(1).map(|z| (x, z)),
            Some((x, z + 1)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|&(x, z)| self.is_walkable(x, z))
    }

    /// A* search between two cells, inclusive of both
    #[must_use]
    pub fn find_cells(&self, start: Cell, goal: Cell) -> Vec<Cell> {
        if !self.is_walkable(start.0, start.1) || !self.is_walkable(goal.0, goal.1) {
            return Vec::new();
        }

        let heuristic = |(x, z): Cell| -> f32 {
            (x as f32 - goal.0 as f32).abs() + (z as f32 - goal.1 as f32).abs()
        };

        let mut open_set = BinaryHeap::new();
        let mut came_from: FxHashMap<Cell, Cell> = FxHashMap::default();
        let mut g_score: FxHashMap<Cell, f32> = FxHashMap::default();

        g_score.insert(start, 0.0);
        open_set.push(Node {
            cell: start,
            f_cost: heuristic(start),
        });

        while let Some(Node { cell: current, .. }) = open_set.pop() {
            if current == goal {
                let mut cells = vec![goal];
                let mut cursor = goal;
                while let Some(&prev) = came_from.get(&cursor) {
                    cells.push(prev);
                    cursor = prev;
                }
                cells.reverse();
                return cells;
            }

            let current_g = g_score.get(&current).copied().unwrap_or(f32::MAX);
            for next in self.neighbors(current) {
                let tentative_g = current_g + 1.0;
                if tentative_g < g_score.get(&next).copied().unwrap_or(f32::MAX) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative_g);
                    open_set.push(Node {
                        cell: next,
                        f_cost: tentative_g + heuristic(next),
                    });
                }
            }
        }

        Vec::new()
    }
}

impl NavQuery for NavGrid {
    fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        let (Some(start), Some(goal)) = (self.world_to_cell(from), self.world_to_cell(to)) else {
            log::debug!("Path request outside the grid: {from} -> {to}");
            return Vec::new();
        };

        let cells = self.find_cells(start, goal);
        if cells.is_empty() {
            log::debug!("No path from {from} to {to}");
            return Vec::new();
        }

        // Drop the start cell; the exact goal replaces the goal cell centre
        let mut waypoints: Vec<Vec3> = cells[1..]
            .iter()
            .map(|&(x, z)| self.cell_to_world(x, z))
            .collect();
        match waypoints.last_mut() {
            Some(last) => *last = Vec3::new(to.x, self.floor_height, to.z),
            None => waypoints.push(Vec3::new(to.x, self.floor_height, to.z)),
        }
        waypoints
    }
}

/// A* node for priority queue
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,
    f_cost: f32,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
