//! Core module
//!
//! Configuration and event plumbing shared by the conditioner, the
//! steering controller and the ECS layer.

mod config;
mod events;

pub use config::{ConditionerConfig, ConfigError, DriveMode, NavConfig, SteeringConfig};
pub use events::{AgentEvent, EventQueue, SteeringEvent};
