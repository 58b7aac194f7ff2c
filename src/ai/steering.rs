//! Path-following steering controller
//!
//! Converts a conditioned path into physics commands once per simulation
//! step. The controller owns the path and every phase transition; callers
//! only hand it new paths through [`SteeringController::set_path`].
//!
//! Two speeds are used: `speed` for open travel toward the front waypoint,
//! and the lower `node_speed` for the brief pass through intermediate nodes,
//! so the agent corners continuously instead of stopping at every node.
//! Approaching the final node, speed decays with the remaining distance
//! until the physics engine reports the body at rest.

use glam::{Quat, Vec3};

use super::geometry::{direction, rotate_towards};
use super::path::Path;
use crate::core::{DriveMode, SteeringConfig, SteeringEvent};
use crate::physics::AgentBody;

/// Motion phase of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No path installed
    #[default]
    Idle,
    /// Steering toward the front waypoint
    Traveling,
    /// The path emptied on the last tick
    Arrived,
}

/// Per-agent steering state machine
#[derive(Debug, Clone)]
pub struct SteeringController {
    config: SteeringConfig,
    path: Path,
    phase: Phase,
    /// Current travel speed, decays during the final approach
    speed: f32,
    /// Last desired velocity sent to the body
    velocity: Vec3,
    facing: Quat,
    events: Vec<SteeringEvent>,
}

impl SteeringController {
    /// Create an idle controller
    #[must_use]
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            speed: config.speed,
            config,
            path: Path::new(),
            phase: Phase::Idle,
            velocity: Vec3::ZERO,
            facing: Quat::IDENTITY,
            events: Vec::new(),
        }
    }

    /// Start from a known facing instead of identity
    #[must_use]
    pub fn with_facing(mut self, facing: Quat) -> Self {
        self.facing = facing;
        self
    }

    /// Install a new path, discarding any path in flight
    ///
    /// Residual forces and velocity are cleared on the body immediately.
    pub fn set_path<B: AgentBody + ?Sized>(&mut self, body: &mut B, path: Path) {
        body.reset_forces();
        body.set_velocity(Vec3::ZERO);
        self.velocity = Vec3::ZERO;
        self.speed = self.config.speed;

        if !self.path.is_empty() {
            self.events.push(SteeringEvent::PathCleared {
                abandoned: self.path.len(),
            });
        }

        self.path = path;
        match self.path.destination() {
            Some(destination) => {
                self.phase = Phase::Traveling;
                self.events.push(SteeringEvent::PathAssigned {
                    nodes: self.path.len(),
                    destination,
                });
                log::debug!(
                    "Path assigned: {} nodes toward {destination}",
                    self.path.len()
                );
            }
            None => self.phase = Phase::Idle,
        }
    }

    /// Drop the current path and stop the body
    pub fn clear<B: AgentBody + ?Sized>(&mut self, body: &mut B) {
        self.set_path(body, Path::new());
    }

    /// Advance one simulation step
    ///
    /// `sight` is the orientation the agent should face; it is blended toward
    /// every tick in every phase. `None` leaves the facing unchanged.
    pub fn tick<B: AgentBody + ?Sized>(&mut self, body: &mut B, sight: Option<Quat>, dt: f32) {
        self.update_facing(body, sight, dt);

        match self.phase {
            Phase::Idle => {}
            Phase::Arrived => self.phase = Phase::Idle,
            Phase::Traveling => self.travel(body),
        }
    }

    fn update_facing<B: AgentBody + ?Sized>(&mut self, body: &mut B, sight: Option<Quat>, dt: f32) {
        let Some(target) = sight else {
            return;
        };
        let max_step = self.config.blend_rate * dt.max(0.0);
        self.facing = rotate_towards(self.facing, target.normalize(), max_step);
        body.set_rotation(self.facing);
    }

    fn travel<B: AgentBody + ?Sized>(&mut self, body: &mut B) {
        let Some(target) = self.path.front() else {
            self.phase = Phase::Idle;
            return;
        };
        let to_target = target - body.position();

        body.reset_forces();

        if to_target.length_squared() > self.config.arrival_radius_sq {
            if let Some(heading) = direction(to_target, self.config.direction_epsilon) {
                // Being outside the radius restarts any final approach
                self.speed = self.config.speed;
                self.drive(body, heading * self.speed);
                return;
            }
        }

        if self.path.is_final_leg() {
            self.approach_destination(body, to_target);
        } else {
            self.pass_node(body);
        }
    }

    /// Inside the arrival radius of the last node
    ///
    /// The decaying speed is written as velocity in both drive modes, starting
    /// from at most `node_speed`, so momentum cannot carry the agent back out
    /// of the radius while it slows down.
    fn approach_destination<B: AgentBody + ?Sized>(&mut self, body: &mut B, to_target: Vec3) {
        let heading = direction(to_target, self.config.direction_epsilon);

        if let Some(heading) = heading.filter(|_| body.is_moving()) {
            let radius = self.config.arrival_radius();
            let falloff = (to_target.length() / radius).clamp(0.0, 1.0);
            self.speed = self.speed.min(self.config.node_speed) * falloff;
            self.velocity = heading * self.speed;
            body.set_velocity(self.velocity);
            return;
        }

        self.speed = self.config.speed;
        self.velocity = Vec3::ZERO;
        body.set_velocity(Vec3::ZERO);
        body.reset_forces();

        if let Some(destination) = self.path.pop_front() {
            self.phase = Phase::Arrived;
            self.events.push(SteeringEvent::PathCompleted { destination });
            log::debug!("Path completed at {destination}");
        }
    }

    /// Inside the arrival radius of an intermediate node
    fn pass_node<B: AgentBody + ?Sized>(&mut self, body: &mut B) {
        let position = body.position();
        let toward_next = self
            .path
            .next()
            .and_then(|next| direction(next - position, self.config.direction_epsilon))
            .map_or(Vec3::ZERO, |heading| heading * self.config.node_speed);

        self.velocity = toward_next;
        body.set_velocity(toward_next);

        if let Some(reached) = self.path.pop_front() {
            self.events.push(SteeringEvent::NodeReached {
                position: reached,
                remaining: self.path.len(),
            });
            log::trace!("Node {reached} reached, {} left", self.path.len());
        }
    }

    fn drive<B: AgentBody + ?Sized>(&mut self, body: &mut B, desired: Vec3) {
        let desired = desired.clamp_length_max(self.config.max_speed);
        self.velocity = desired;
        match self.config.drive {
            DriveMode::Force => body.apply_force(desired),
            DriveMode::Velocity => body.set_velocity(desired),
        }
    }

    /// Take the events recorded since the last call
    pub fn drain_events(&mut self) -> impl Iterator<Item = SteeringEvent> + '_ {
        self.events.drain(..)
    }

    /// Current phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check whether no navigation is active
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Remaining path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current travel speed
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Last desired velocity
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Current facing
    #[must_use]
    pub fn facing(&self) -> Quat {
        self.facing
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }
}

impl Default for SteeringController {
    fn default() -> Self {
        Self::new(SteeringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    /// Point-mass body with linear damping
    #[derive(Debug, Default)]
    struct TestBody {
        position: Vec3,
        velocity: Vec3,
        force: Vec3,
        rotation: Quat,
        damping: f32,
    }

    impl TestBody {
        fn at(position: Vec3) -> Self {
            Self {
                position,
                damping: 4.0,
                ..Default::default()
            }
        }

        fn step(&mut self, dt: f32) {
            self.velocity += self.force * dt;
            self.velocity /= 1.0 + self.damping * dt;
            self.position += self.velocity * dt;
        }
    }

    impl AgentBody for TestBody {
        fn position(&self) -> Vec3 {
            self.position
        }

        fn set_velocity(&mut self, velocity: Vec3) {
            self.velocity = velocity;
        }

        fn apply_force(&mut self, force: Vec3) {
            self.force += force;
        }

        fn reset_forces(&mut self) {
            self.force = Vec3::ZERO;
        }

        fn set_rotation(&mut self, rotation: Quat) {
            self.rotation = rotation;
        }

        fn is_moving(&self) -> bool {
            self.velocity.length_squared() > 1e-4
        }
    }

    /// Tick and step until the controller goes idle; returns ticks used
    fn run_until_idle(
        controller: &mut SteeringController,
        body: &mut TestBody,
        max_ticks: usize,
    ) -> Option<usize> {
        for tick in 0..max_ticks {
            controller.tick(body, None, DT);
            if controller.is_idle() {
                return Some(tick);
            }
            body.step(DT);
        }
        None
    }

    #[test]
    fn test_starts_idle() {
        let controller = SteeringController::default();
        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.path().is_empty());
    }

    #[test]
    fn test_idle_tick_is_noop() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::new(1.0, 2.0, 3.0));
        body.velocity = Vec3::new(0.5, 0.0, 0.0);

        for _ in 0..10 {
            controller.tick(&mut body, None, DT);
        }

        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.velocity, Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(body.force, Vec3::ZERO);
    }

    #[test]
    fn test_reset_on_replace() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::ZERO);

        controller.set_path(&mut body, Path::from(vec![Vec3::new(10.0, 0.0, 0.0)]));
        controller.tick(&mut body, None, DT);
        body.step(DT);
        body.apply_force(Vec3::X * 5.0);
        assert!(body.velocity.length() > 0.0);

        controller.set_path(&mut body, Path::from(vec![Vec3::new(0.0, 0.0, -10.0)]));
        controller.set_path(&mut body, Path::from(vec![Vec3::new(-10.0, 0.0, 0.0)]));

        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.force, Vec3::ZERO);
        assert_eq!(controller.velocity(), Vec3::ZERO);
        assert_eq!(controller.phase(), Phase::Traveling);
        assert_eq!(controller.path().front(), Some(Vec3::new(-10.0, 0.0, 0.0)));

        let events: Vec<_> = controller.drain_events().collect();
        assert!(matches!(events[0], SteeringEvent::PathAssigned { nodes: 1, .. }));
        assert!(matches!(events[1], SteeringEvent::PathCleared { abandoned: 1 }));
        assert!(matches!(events[3], SteeringEvent::PathCleared { abandoned: 1 }));
    }

    #[test]
    fn test_empty_path_goes_idle() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::ZERO);

        controller.set_path(&mut body, Path::from(vec![Vec3::X * 5.0]));
        controller.clear(&mut body);

        assert_eq!(controller.phase(), Phase::Idle);
        assert!(controller.path().is_empty());
    }

    #[test]
    fn test_travel_force_is_clamped() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::ZERO);

        controller.set_path(&mut body, Path::from(vec![Vec3::new(0.0, 0.0, 20.0)]));
        controller.tick(&mut body, None, DT);

        assert!((body.force.length() - 25.0).abs() < 1e-4);
        assert!(body.force.z > 0.0);
        assert_eq!(controller.path().len(), 1);
    }

    #[test]
    fn test_forces_do_not_accumulate_across_ticks() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::ZERO);

        controller.set_path(&mut body, Path::from(vec![Vec3::new(100.0, 0.0, 0.0)]));
        for _ in 0..5 {
            controller.tick(&mut body, None, DT);
        }

        assert!((body.force.length() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_intermediate_node_uses_node_speed() {
        let config = SteeringConfig::default();
        let mut controller = SteeringController::new(config.clone());
        let mut body = TestBody::at(Vec3::new(0.1, 0.0, 0.0));

        let path = Path::from(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0)]);
        controller.set_path(&mut body, path);
        controller.tick(&mut body, None, DT);

        assert_eq!(controller.path().len(), 1);
        assert!((body.velocity.length() - config.node_speed).abs() < 1e-4);
        assert!(body.velocity.z > 0.0);

        let events: Vec<_> = controller.drain_events().collect();
        assert!(matches!(
            events.last(),
            Some(SteeringEvent::NodeReached { remaining: 1, .. })
        ));
    }

    #[test]
    fn test_degenerate_node_does_not_produce_nan() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::new(2.0, 0.0, 2.0));

        let path = Path::from(vec![
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 2.0),
        ]);
        controller.set_path(&mut body, path);

        for _ in 0..5 {
            controller.tick(&mut body, None, DT);
            assert!(body.velocity.is_finite());
            assert!(body.force.is_finite());
        }

        assert!(controller.path().is_empty());
        assert!(controller.is_idle());
    }

    #[test]
    fn test_final_approach_decelerates() {
        let config = SteeringConfig::default().with_drive(DriveMode::Velocity);
        let mut controller = SteeringController::new(config.clone());
        let mut body = TestBody::at(Vec3::new(0.8, 0.0, 0.0));
        body.velocity = Vec3::new(-1.0, 0.0, 0.0);

        controller.set_path(&mut body, Path::from(vec![Vec3::ZERO]));
        body.velocity = Vec3::new(-1.0, 0.0, 0.0);

        let mut previous = controller.speed();
        for _ in 0..10 {
            controller.tick(&mut body, None, DT);
            if controller.path().is_empty() {
                break;
            }
            assert!(controller.speed() <= previous);
            previous = controller.speed();
            body.step(DT);
        }
        assert!(previous < config.speed);
    }

    #[test]
    fn test_arrival_convergence_velocity_drive() {
        let config = SteeringConfig::default().with_drive(DriveMode::Velocity);
        let mut controller = SteeringController::new(config.clone());
        let mut body = TestBody::at(Vec3::ZERO);
        let destination = Vec3::new(3.0, 0.0, 4.0);

        let path = Path::from(vec![
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 2.0),
            destination,
        ]);
        controller.set_path(&mut body, path);

        assert!(run_until_idle(&mut controller, &mut body, 2_000).is_some());
        assert!(body.position.distance_squared(destination) < config.arrival_radius_sq);
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!(controller.path().is_empty());
        assert!((controller.speed() - config.speed).abs() < f32::EPSILON);
    }

    #[test]
    fn test_arrival_convergence_force_drive() {
        let config = SteeringConfig::default();
        let mut controller = SteeringController::new(config.clone());
        let mut body = TestBody::at(Vec3::ZERO);
        let destination = Vec3::new(-6.0, 0.0, 2.0);

        controller.set_path(&mut body, Path::from(vec![destination]));

        assert!(run_until_idle(&mut controller, &mut body, 10_000).is_some());
        assert!(body.position.distance_squared(destination) < config.arrival_radius_sq);
    }

    #[test]
    fn test_arrived_then_idle() {
        let mut controller = SteeringController::default();
        let mut body = TestBody::at(Vec3::ZERO);

        controller.set_path(&mut body, Path::from(vec![Vec3::new(0.1, 0.0, 0.0)]));
        controller.tick(&mut body, None, DT);
        assert_eq!(controller.phase(), Phase::Arrived);

        let events: Vec<_> = controller.drain_events().collect();
        assert!(matches!(
            events.last(),
            Some(SteeringEvent::PathCompleted { .. })
        ));

        controller.tick(&mut body, None, DT);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[test]
    fn test_facing_blends_in_any_phase() {
        let config = SteeringConfig::default().with_blend_rate(1.0);
        let mut controller = SteeringController::new(config);
        let mut body = TestBody::at(Vec3::ZERO);
        let sight = Quat::from_rotation_y(std::f32::consts::PI * 0.75);

        controller.tick(&mut body, Some(sight), 0.1);
        let stepped = controller.facing();
        assert!((stepped.angle_between(Quat::IDENTITY) - 0.1).abs() < 1e-3);
        assert!(body.rotation.angle_between(stepped) < 1e-5);
        assert_eq!(body.velocity, Vec3::ZERO);

        for _ in 0..100 {
            controller.tick(&mut body, Some(sight), 0.1);
        }
        assert!(controller.facing().angle_between(sight) < 1e-3);

        let before = controller.facing();
        controller.tick(&mut body, None, 0.1);
        assert_eq!(controller.facing(), before);
    }

    #[test]
    fn test_initial_facing_is_kept_without_target() {
        let start = Quat::from_rotation_y(1.0);
        let mut controller = SteeringController::default().with_facing(start);
        let mut body = TestBody::at(Vec3::ZERO);

        controller.tick(&mut body, None, DT);
        assert_eq!(controller.facing(), start);

        // Blending starts from the given facing, not identity
        controller.tick(&mut body, Some(Quat::from_rotation_y(1.5)), 0.1);
        assert!(controller.facing().angle_between(start) < 0.1 * std::f32::consts::PI + 1e-3);
        assert!(controller.facing().angle_between(Quat::IDENTITY) > 0.9);
    }
}
