//! Physics module
//!
//! The agent body contract and its rapier3d implementation

mod body;
mod world;

pub use body::AgentBody;
pub use world::{AgentBodyDesc, ColliderHandle, Physics, RapierAgent, RigidBodyHandle};
