//! The body contract the steering controller drives

use glam::{Quat, Vec3};

/// A physically simulated agent body
///
/// The controller only borrows a body for the duration of a call; the
/// surrounding application owns it.
pub trait AgentBody {
    /// Current world position
    fn position(&self) -> Vec3;

    /// Overwrite the linear velocity
    fn set_velocity(&mut self, velocity: Vec3);

    /// Add a force for the next physics step
    fn apply_force(&mut self, force: Vec3);

    /// Drop every force accumulated for the next step
    fn reset_forces(&mut self);

    /// Overwrite the orientation
    fn set_rotation(&mut self, rotation: Quat);

    /// Motion flag as reported by the physics engine
    fn is_moving(&self) -> bool;
}

impl<B: AgentBody + ?Sized> AgentBody for &mut B {
    fn position(&self) -> Vec3 {
        (**self).position()
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        (**self).set_velocity(velocity);
    }

    fn apply_force(&mut self, force: Vec3) {
        (**self).apply_force(force);
    }

    fn reset_forces(&mut self) {
        (**self).reset_forces();
    }

    fn set_rotation(&mut self, rotation: Quat) {
        (**self).set_rotation(rotation);
    }

    fn is_moving(&self) -> bool {
        (**self).is_moving()
    }
}
