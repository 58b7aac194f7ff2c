//! Headless demo: two agents walking around pillars on a rapier ground plane
//!
//! Usage: `waypath [config.ron]`. Set `RUST_LOG=debug` to follow the paths.

use waypath::ecs::{all_idle, request_move, steer_agents};
use waypath::hecs::World;
use waypath::prelude::*;

const STEP: f32 = 1.0 / 60.0;
const MAX_STEPS: usize = 60 * 60;
/// Height of an agent's centre above the ground it stands on
const STANDING_HEIGHT: f32 = 1.0;

fn load_config() -> Result<NavConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(NavConfig::load_ron(path)?),
        None => {
            log::info!("No config given, using defaults");
            Ok(NavConfig::default())
        }
    }
}

fn build_scene(physics: &mut Physics, grid: &mut NavGrid) {
    physics.add_ground(Vec3::new(0.0, -0.5, 0.0), Vec3::new(20.0, 0.5, 20.0));

    let pillars = [
        Vec3::new(-2.0, 0.0, 3.0),
        Vec3::new(3.0, 0.0, -1.0),
        Vec3::new(0.0, 0.0, -6.0),
    ];
    for base in pillars {
        physics.add_obstacle(base, 0.6, 3.0);
        grid.block_disc(base, 1.0);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    log::info!("Starting navigation demo");

    let mut physics = Physics::new();
    let mut grid = NavGrid::new(40, 40, 1.0)
        .with_origin(Vec2::new(-20.0, -20.0))
        .with_floor_height(STANDING_HEIGHT);
    build_scene(&mut physics, &mut grid);

    let conditioner = PathConditioner::new(config.conditioner.clone());
    let mut world = World::new();
    let mut events = EventQueue::new();

    let agents = [
        ("scout", Vec3::new(-8.0, STANDING_HEIGHT, 8.0), Vec3::new(8.0, STANDING_HEIGHT, -8.0)),
        ("porter", Vec3::new(6.0, STANDING_HEIGHT, 6.0), Vec3::new(-4.0, STANDING_HEIGHT, -4.0)),
    ];

    let mut spawned = Vec::new();
    for (name, start, destination) in agents {
        let body = physics.create_agent_body(start, AgentBodyDesc::default());
        let entity = world.spawn((
            Name::new(name),
            NavAgent { body },
            SteeringController::new(config.steering.clone()),
            SightTarget(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        ));
        spawned.push((entity, destination));
    }

    for (entity, destination) in spawned {
        match request_move(&mut world, &mut physics, &grid, &conditioner, entity, destination) {
            Some(nodes) => log::info!("{entity:?}: {nodes} nodes toward {destination}"),
            None => log::warn!("{entity:?}: move request rejected"),
        }
    }

    for step in 0..MAX_STEPS {
        events.swap();
        for event in events.iter() {
            let name = world
                .get::<&Name>(event.entity)
                .map(|n| n.to_string())
                .unwrap_or_default();
            match event.event {
                SteeringEvent::PathCompleted { destination } => {
                    log::info!("{name} arrived at {destination}");
                }
                other => log::debug!("{name}: {other:?}"),
            }
        }

        steer_agents(&mut world, &mut physics, &mut events, STEP);
        physics.step(STEP);

        if all_idle(&world) && events.pending_count() == 0 {
            log::info!("All agents idle after {step} steps");
            return Ok(());
        }
    }

    log::warn!("Step budget exhausted before every agent arrived");
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Demo error: {e}");
        std::process::exit(1);
    }
}
