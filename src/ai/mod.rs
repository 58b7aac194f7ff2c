//! Navigation module
//!
//! Path conditioning, path-following steering and the query contracts they
//! consume.

mod conditioner;
mod geometry;
mod path;
mod pathfinding;
mod scene;
mod steering;

pub use conditioner::{
    PathConditioner, densify, lateral_clear, merge_close, plan_path, vertical_snap,
};
pub use geometry::{direction, horizontal_distance, rotate_towards};
pub use path::Path;
pub use pathfinding::{NavGrid, NavQuery};
pub use scene::{EmptyScene, GroundPatch, ObstacleQuery, StaticScene};
pub use steering::{Phase, SteeringController};
