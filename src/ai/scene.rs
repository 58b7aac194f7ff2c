//! Scene queries used by path conditioning
//!
//! The conditioner never owns scene geometry; it asks an `ObstacleQuery`
//! for nearby obstacles and for the ground under a point, once per call.

use glam::{Vec2, Vec3};

use super::geometry::horizontal_distance;

/// Read-only view of scene geometry
pub trait ObstacleQuery {
    /// Height of the highest surface hit by a ray cast straight down from
    /// `origin` over at most `max_distance`
    fn ground_height(&self, origin: Vec3, max_distance: f32) -> Option<f32>;

    /// Positions of obstacles within roughly `radius` of `center`
    ///
    /// Implementations may over-report; callers re-check distances.
    fn obstacles_near(&self, center: Vec3, radius: f32) -> Vec<Vec3>;
}

/// A scene with nothing in it: every query misses
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScene;

impl ObstacleQuery for EmptyScene {
    fn ground_height(&self, _origin: Vec3, _max_distance: f32) -> Option<f32> {
        None
    }

    fn obstacles_near(&self, _center: Vec3, _radius: f32) -> Vec<Vec3> {
        Vec::new()
    }
}

/// Horizontal rectangle of walkable surface at a fixed height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPatch {
    /// Minimum corner on the XZ plane
    pub min: Vec2,
    /// Maximum corner on the XZ plane
    pub max: Vec2,
    /// Surface height
    pub height: f32,
}

impl GroundPatch {
    /// Create a patch from two XZ corners
    #[must_use]
    pub fn new(a: Vec2, b: Vec2, height: f32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            height,
        }
    }

    /// Check whether a point lies over this patch
    #[must_use]
    pub fn covers(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.z >= self.min.y
            && point.z <= self.max.y
    }
}

/// In-memory scene of point obstacles and ground patches
#[derive(Debug, Clone, Default)]
pub struct StaticScene {
    obstacles: Vec<Vec3>,
    ground: Vec<GroundPatch>,
}

impl StaticScene {
    /// Create an empty scene
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a point obstacle
    #[must_use]
    pub fn with_obstacle(mut self, position: Vec3) -> Self {
        self.obstacles.push(position);
        self
    }

    /// Add a ground patch
    #[must_use]
    pub fn with_ground(mut self, patch: GroundPatch) -> Self {
        self.ground.push(patch);
        self
    }

    /// Add a point obstacle
    pub fn add_obstacle(&mut self, position: Vec3) {
        self.obstacles.push(position);
    }

    /// Add a ground patch
    pub fn add_ground(&mut self, patch: GroundPatch) {
        self.ground.push(patch);
    }

    /// All obstacles
    #[must_use]
    pub fn obstacles(&self) -> &[Vec3] {
        &self.obstacles
    }
}

impl ObstacleQuery for StaticScene {
    fn ground_height(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let lowest = origin.y - max_distance;
        self.ground
            .iter()
            .filter(|patch| patch.covers(origin))
            .map(|patch| patch.height)
            .filter(|&height| height <= origin.y && height >= lowest)
            .reduce(f32::max)
    }

    fn obstacles_near(&self, center: Vec3, radius: f32) -> Vec<Vec3> {
        self.obstacles
            .iter()
            .copied()
            .filter(|&obstacle| horizontal_distance(obstacle, center) < radius)
            .collect()
    }
}
