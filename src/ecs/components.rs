//! Agent components
//!
//! An agent entity carries a `NavAgent`, its own `SteeringController` and
//! optionally a `SightTarget` and a `Name`.

use glam::Quat;

use crate::physics::RigidBodyHandle;

/// Links an entity to its physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavAgent {
    /// Dynamic body the controller steers
    pub body: RigidBodyHandle,
}

/// Orientation the agent should face, independent of travel direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightTarget(pub Quat);

/// Name component for logging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    /// Create a new name component
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
