//! Path conditioning
//!
//! Turns a sparse waypoint list from a navigation query into a path an agent
//! can follow without clipping scenery:
//!
//! 1. densify: interpolate intermediate nodes between waypoints
//! 2. lateral clear: push nodes horizontally out of obstacle clearance
//! 3. vertical snap: rest nodes on the highest ground beneath them
//! 4. merge close: collapse nearly coincident neighbours (off by default)
//!
//! Conditioning is deterministic but not idempotent. Re-running it on its
//! own output densifies again, so condition each raw path exactly once.

use glam::Vec3;

use super::geometry::{direction, horizontal_offset};
use super::path::Path;
use super::pathfinding::NavQuery;
use super::scene::ObstacleQuery;
use crate::core::ConditionerConfig;

/// Offsets shorter than this have no usable push direction
const PUSH_EPSILON: f32 = 1e-6;

/// Stateless path conditioner
#[derive(Debug, Clone, Default)]
pub struct PathConditioner {
    config: ConditionerConfig,
}

impl PathConditioner {
    /// Create a conditioner with the given configuration
    #[must_use]
    pub fn new(config: ConditionerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ConditionerConfig {
        &self.config
    }

    /// Condition a raw waypoint list for an agent standing at `agent_position`
    ///
    /// Returns a fresh path; an empty input yields an empty path.
    pub fn condition<Q: ObstacleQuery + ?Sized>(
        &self,
        raw: &[Vec3],
        agent_position: Vec3,
        scene: &Q,
    ) -> Path {
        let Some(&raw_last) = raw.last() else {
            return Path::new();
        };
        let config = &self.config;

        let mut nodes = if !config.densify {
            raw.to_vec()
        } else if raw.len() == 1 {
            densify(&[agent_position, raw_last], config.single_node_segments)
        } else {
            densify(raw, config.segments_per_span)
        };

        // Interpolation may have drifted the destination height
        if let Some(last) = nodes.last_mut() {
            last.y = raw_last.y;
        }

        let final_index = nodes.len() - 1;
        for (index, node) in nodes.iter_mut().enumerate() {
            if config.lateral_clear {
                let obstacles = scene.obstacles_near(*node, config.clearance_radius);
                *node = lateral_clear(*node, &obstacles, config.clearance_radius);
            }
            if config.vertical_snap && index != final_index {
                *node = vertical_snap(
                    *node,
                    scene,
                    config.ground_offset,
                    config.probe_height,
                    config.probe_depth,
                );
            }
        }

        if config.merge_close {
            merge_close(&mut nodes, config.merge_epsilon);
        }

        log::debug!(
            "Conditioned path: {} raw waypoints -> {} nodes",
            raw.len(),
            nodes.len()
        );

        Path::from(nodes)
    }
}

/// Query `nav` for raw waypoints and condition them in one call
pub fn plan_path<N, Q>(
    nav: &N,
    conditioner: &PathConditioner,
    scene: &Q,
    from: Vec3,
    to: Vec3,
) -> Path
where
    N: NavQuery + ?Sized,
    Q: ObstacleQuery + ?Sized,
{
    let raw = nav.find_path(from, to);
    if raw.is_empty() {
        log::debug!("Navigation query returned no waypoints for {from} -> {to}");
    }
    conditioner.condition(&raw, from, scene)
}

/// Linearly interpolate `segments` segments between each consecutive pair
///
/// A two-point input yields exactly `segments + 1` points with both
/// endpoints preserved. Shared endpoints between spans are not duplicated.
#[must_use]
pub fn densify(path: &[Vec3], segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    let Some(&first) = path.first() else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity((path.len() - 1) * segments + 1);
    result.push(first);

    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        for i in 1..=segments {
            if i == segments {
                result.push(b);
            } else {
                result.push(a.lerp(b, i as f32 / segments as f32));
            }
        }
    }

    result
}

/// Push `node` horizontally out of the clearance radius of each obstacle
///
/// The height of `node` is never changed. A node sitting exactly on an
/// obstacle's axis is pushed along +X.
#[must_use]
pub fn lateral_clear(node: Vec3, obstacles: &[Vec3], clearance_radius: f32) -> Vec3 {
    let mut adjusted = node;

    for &obstacle in obstacles {
        let offset = horizontal_offset(obstacle, adjusted);
        let distance = offset.length();
        if distance >= clearance_radius {
            continue;
        }

        let away = direction(offset, PUSH_EPSILON).unwrap_or(Vec3::X);
        adjusted += away * (clearance_radius - distance);

        log::trace!(
            "Pushed node {node} away from obstacle {obstacle} by {:.3}",
            clearance_radius - distance
        );
    }

    adjusted
}

/// Rest `node` at `ground_offset` above the highest ground beneath it
///
/// Leaves the node untouched when nothing is hit.
#[must_use]
pub fn vertical_snap<Q: ObstacleQuery + ?Sized>(
    node: Vec3,
    scene: &Q,
    ground_offset: f32,
    probe_height: f32,
    probe_depth: f32,
) -> Vec3 {
    let origin = node + Vec3::Y * probe_height;
    match scene.ground_height(origin, probe_height + probe_depth) {
        Some(ground) => Vec3::new(node.x, ground + ground_offset, node.z),
        None => {
            log::trace!("No ground under node {node}, keeping height");
            node
        }
    }
}

/// Collapse adjacent nodes closer than `epsilon` into their centroid
///
/// The merged node averages x and z and keeps the first node's height.
/// Stops once no pair is too close or fewer than two nodes remain.
pub fn merge_close(nodes: &mut Vec<Vec3>, epsilon: f32) {
    while nodes.len() >= 2 {
        let Some(index) = (0..nodes.len() - 1).find(|&i| nodes[i].distance(nodes[i + 1]) < epsilon)
        else {
            break;
        };

        let first = nodes[index];
        let second = nodes.remove(index + 1);
        nodes[index] = Vec3::new(
            (first.x + second.x) * 0.5,
            first.y,
            (first.z + second.z) * 0.5,
        );
    }
}
