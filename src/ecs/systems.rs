//! Agent systems
//!
//! `request_move` is what an input handler calls on click-to-move;
//! `steer_agents` runs once per simulation step before the physics step.

use glam::Vec3;
use hecs::{Entity, World};

use super::components::{NavAgent, SightTarget};
use crate::ai::{NavQuery, PathConditioner, SteeringController, plan_path};
use crate::core::EventQueue;
use crate::physics::Physics;

/// Plan a path for `entity` toward `destination` and install it
///
/// Returns the number of waypoints installed, or `None` if the entity is not
/// a navigating agent. An unreachable destination installs an empty path,
/// which stops the agent.
pub fn request_move<N: NavQuery + ?Sized>(
    world: &mut World,
    physics: &mut Physics,
    nav: &N,
    conditioner: &PathConditioner,
    entity: Entity,
    destination: Vec3,
) -> Option<usize> {
    let (agent, controller) = world
        .query_one_mut::<(&NavAgent, &mut SteeringController)>(entity)
        .ok()?;

    let Some(from) = physics.get_position(agent.body) else {
        log::warn!("Agent {entity:?} has no physics body");
        return None;
    };
    let path = plan_path(nav, conditioner, &*physics, from, destination);
    let nodes = path.len();

    let mut body = physics.agent(agent.body)?;
    controller.set_path(&mut body, path);
    Some(nodes)
}

/// Tick every agent's controller and collect their events
pub fn steer_agents(world: &mut World, physics: &mut Physics, events: &mut EventQueue, dt: f32) {
    for (entity, (agent, controller, sight)) in
        world.query_mut::<(&NavAgent, &mut SteeringController, Option<&SightTarget>)>()
    {
        let Some(mut body) = physics.agent(agent.body) else {
            log::warn!("Agent {entity:?} lost its physics body");
            continue;
        };
        controller.tick(&mut body, sight.map(|s| s.0), dt);
        events.extend(entity, controller.drain_events());
    }
}

/// Check whether every agent has finished navigating
pub fn all_idle(world: &World) -> bool {
    let mut query = world.query::<&SteeringController>();
    query.iter().all(|(_, controller)| controller.is_idle())
}

/// Stop an agent in place
pub fn stop_agent(world: &mut World, physics: &mut Physics, entity: Entity) -> bool {
    let Ok((agent, controller)) =
        world.query_one_mut::<(&NavAgent, &mut SteeringController)>(entity)
    else {
        return false;
    };
    let Some(mut body) = physics.agent(agent.body) else {
        return false;
    };
    controller.clear(&mut body);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::NavGrid;
    use crate::core::{ConditionerConfig, SteeringConfig, SteeringEvent};
    use crate::ecs::Name;
    use crate::physics::AgentBodyDesc;
    use glam::{Quat, Vec2};

    fn setup() -> (World, Physics, Entity) {
        let mut physics = Physics::new();
        physics.add_ground(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0));
        let body = physics.create_agent_body(Vec3::new(0.5, 1.0, 0.5), AgentBodyDesc::default());

        let mut world = World::new();
        let entity = world.spawn((
            Name::new("runner"),
            NavAgent { body },
            SteeringController::new(SteeringConfig::default()),
        ));
        (world, physics, entity)
    }

    #[test]
    fn test_request_move_installs_path() {
        let (mut world, mut physics, entity) = setup();
        let grid = NavGrid::new(10, 10, 1.0).with_origin(Vec2::ZERO);
        let conditioner = PathConditioner::new(ConditionerConfig::default());

        let nodes = request_move(
            &mut world,
            &mut physics,
            &grid,
            &conditioner,
            entity,
            Vec3::new(4.5, 0.0, 0.5),
        );

        assert!(nodes.is_some_and(|n| n > 1));
        let controller = world.get::<&SteeringController>(entity).unwrap();
        assert!(!controller.is_idle());
        assert_eq!(controller.path().destination(), Some(Vec3::new(4.5, 0.0, 0.5)));
    }

    #[test]
    fn test_request_move_ignores_non_agents() {
        let (mut world, mut physics, _) = setup();
        let bystander = world.spawn((Name::new("rock"),));
        let grid = NavGrid::new(10, 10, 1.0);

        let nodes = request_move(
            &mut world,
            &mut physics,
            &grid,
            &PathConditioner::default(),
            bystander,
            Vec3::ONE,
        );
        assert!(nodes.is_none());
    }

    #[test]
    fn test_steer_agents_forwards_events() {
        let (mut world, mut physics, entity) = setup();
        let mut events = EventQueue::new();
        world
            .insert_one(entity, SightTarget(Quat::from_rotation_y(0.5)))
            .unwrap();

        {
            let (agent, controller) = world
                .query_one_mut::<(&NavAgent, &mut SteeringController)>(entity)
                .unwrap();
            let mut body = physics.agent(agent.body).unwrap();
            controller.set_path(&mut body, vec![Vec3::new(0.6, 1.0, 0.5)].into());
        }

        steer_agents(&mut world, &mut physics, &mut events, 1.0 / 60.0);
        events.swap();

        let recorded: Vec<_> = events.iter().map(|e| (e.entity, e.event)).collect();
        assert!(recorded.iter().all(|(e, _)| *e == entity));
        assert!(recorded
            .iter()
            .any(|(_, event)| matches!(event, SteeringEvent::PathAssigned { nodes: 1, .. })));
        assert!(recorded
            .iter()
            .any(|(_, event)| matches!(event, SteeringEvent::PathCompleted { .. })));
        let body = world.get::<&NavAgent>(entity).unwrap().body;
        let rotation = physics.get_rotation(body).unwrap();
        assert!(rotation.angle_between(Quat::IDENTITY) > 0.01);
    }

    #[test]
    fn test_stop_agent() {
        let (mut world, mut physics, entity) = setup();
        let grid = NavGrid::new(10, 10, 1.0);
        request_move(
            &mut world,
            &mut physics,
            &grid,
            &PathConditioner::default(),
            entity,
            Vec3::new(8.5, 0.0, 8.5),
        );

        assert!(stop_agent(&mut world, &mut physics, entity));
        assert!(all_idle(&world));
    }
}
