//! Path conditioning and steering for physics-driven agents
//!
//! This crate provides:
//! - Path conditioning: densify, clear obstacles and ground-snap raw waypoints
//! - A per-agent steering controller driving a physics body along the path
//! - Physics integration with rapier3d
//! - ECS integration with hecs

pub mod ai;
pub mod core;
pub mod ecs;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        NavGrid, NavQuery, ObstacleQuery, Path, PathConditioner, Phase, SteeringController,
        plan_path,
    };
    pub use crate::core::{
        ConditionerConfig, DriveMode, EventQueue, NavConfig, SteeringConfig, SteeringEvent,
    };
    pub use crate::ecs::{Name, NavAgent, SightTarget};
    pub use crate::physics::{AgentBody, AgentBodyDesc, Physics, RigidBodyHandle};
    pub use glam::{Quat, Vec2, Vec3};
}
