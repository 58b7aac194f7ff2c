//! Physics world using rapier3d
//!
//! Hosts agent bodies, static ground and obstacle colliders. Implements the
//! body contract for agents and the scene queries used by conditioning.

use glam::{Quat, Vec2, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;
use rustc_hash::FxHashSet;

use super::body::AgentBody;
use crate::ai::ObstacleQuery;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert rapier3d UnitQuaternion to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Agent body tuning
#[derive(Debug, Clone, Copy)]
pub struct AgentBodyDesc {
    /// Half extents of the box collider
    pub half_extents: Vec3,
    /// Collider density
    pub density: f32,
    /// Linear damping of the body
    pub linear_damping: f32,
}

impl Default for AgentBodyDesc {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(0.5, 1.0, 0.5),
            density: 1.0,
            linear_damping: 2.0,
        }
    }
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    /// Linear speed below which an agent counts as not moving
    pub rest_speed: f32,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    integration_parameters: IntegrationParameters,
    /// Colliders reported by `obstacles_near`
    obstacles: FxHashSet<rapier3d::geometry::ColliderHandle>,
}

impl Physics {
    /// Create a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            rest_speed: 0.05,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            obstacles: FxHashSet::default(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Refresh scene queries after adding colliders outside of a step
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    fn insert_fixed(&mut self, position: Vec3, collider: Collider) -> ColliderHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y, position.z])
            .build();
        let body = self.rigid_body_set.insert(body);
        let handle = self
            .collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set);
        self.update_queries();
        ColliderHandle(handle)
    }

    /// Add a static box of walkable ground centred at `position`
    pub fn add_ground(&mut self, position: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.insert_fixed(position, collider)
    }

    /// Add a static cylindrical obstacle standing on `base`
    pub fn add_obstacle(&mut self, base: Vec3, radius: f32, height: f32) -> ColliderHandle {
        let half_height = height * 0.5;
        let collider = ColliderBuilder::cylinder(half_height, radius).build();
        let handle = self.insert_fixed(base + Vec3::Y * half_height, collider);
        self.obstacles.insert(handle.0);
        handle
    }

    /// Create a dynamic agent body that never sleeps and cannot tip over
    pub fn create_agent_body(&mut self, position: Vec3, desc: AgentBodyDesc) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, position.z])
            .linear_damping(desc.linear_damping)
            .can_sleep(false)
            .lock_rotations()
            .build();
        let body = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::cuboid(
            desc.half_extents.x,
            desc.half_extents.y,
            desc.half_extents.z,
        )
        .density(desc.density)
        .build();
        self.collider_set
            .insert_with_parent(collider, body, &mut self.rigid_body_set);

        RigidBodyHandle(body)
    }

    /// Borrow an agent body for steering
    pub fn agent(&mut self, body: RigidBodyHandle) -> Option<RapierAgent<'_>> {
        let rest_speed = self.rest_speed;
        self.rigid_body_set
            .get_mut(body.0)
            .map(|body| RapierAgent { body, rest_speed })
    }

    /// Get the position of a rigid body
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| to_vec3(rb.translation()))
    }

    /// Get the rotation of a rigid body
    pub fn get_rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| rapier_to_quat(rb.rotation()))
    }

    /// Get the linear velocity of a body
    pub fn get_linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| to_vec3(rb.linvel()))
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        if let Some(removed) = self.rigid_body_set.remove(
            body.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        ) {
            for collider in removed.colliders() {
                self.obstacles.remove(collider);
            }
        }
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleQuery for Physics {
    fn ground_height(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], vector![0.0, -1.0, 0.0]);

        // Obstacle tops are not walkable ground
        let not_obstacle = |handle: rapier3d::geometry::ColliderHandle, _: &Collider| {
            !self.obstacles.contains(&handle)
        };
        let filter = QueryFilter::only_fixed().predicate(&not_obstacle);

        // Casting down, the first hit is the highest surface under the origin
        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(_, distance)| ray.point_at(distance).y)
    }

    fn obstacles_near(&self, center: Vec3, radius: f32) -> Vec<Vec3> {
        if radius <= 0.0 {
            return Vec::new();
        }

        // Obstacles are vertical columns, so only the horizontal offset counts
        let mut found: Vec<Vec3> = self
            .obstacles
            .iter()
            .filter_map(|&handle| self.collider_set.get(handle))
            .map(|collider| to_vec3(collider.translation()))
            .filter(|axis| Vec2::new(axis.x - center.x, axis.z - center.z).length() < radius)
            .collect();

        // Set iteration order is unspecified; keep conditioning deterministic
        found.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.z.total_cmp(&b.z)));
        found
    }
}

/// Mutable view of one agent body inside the physics world
pub struct RapierAgent<'a> {
    body: &'a mut RigidBody,
    rest_speed: f32,
}

impl AgentBody for RapierAgent<'_> {
    fn position(&self) -> Vec3 {
        to_vec3(self.body.translation())
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body
            .set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
    }

    fn apply_force(&mut self, force: Vec3) {
        self.body.add_force(vector![force.x, force.y, force.z], true);
    }

    fn reset_forces(&mut self) {
        self.body.reset_forces(true);
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.body.set_rotation(quat_to_rapier(rotation), true);
    }

    fn is_moving(&self) -> bool {
        self.body.linvel().norm_squared() > self.rest_speed * self.rest_speed
    }
}
