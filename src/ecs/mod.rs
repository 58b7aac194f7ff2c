//! Entity Component System integration
//!
//! Agents are hecs entities; each owns an independent steering controller.

mod components;
mod systems;

pub use components::{Name, NavAgent, SightTarget};
pub use systems::{all_idle, request_move, steer_agents, stop_agent};
