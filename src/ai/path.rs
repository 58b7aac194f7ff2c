//! Waypoint paths consumed front to back

use std::collections::VecDeque;

use glam::Vec3;

/// An ordered sequence of waypoints. The front is the next target.
///
/// An empty path means "no active navigation".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    nodes: VecDeque<Vec3>,
}

impl Path {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next waypoint to reach
    #[must_use]
    pub fn front(&self) -> Option<Vec3> {
        self.nodes.front().copied()
    }

    /// Waypoint after the front, if any
    #[must_use]
    pub fn next(&self) -> Option<Vec3> {
        self.nodes.get(1).copied()
    }

    /// Final waypoint
    #[must_use]
    pub fn destination(&self) -> Option<Vec3> {
        self.nodes.back().copied()
    }

    /// Consume the front waypoint
    pub fn pop_front(&mut self) -> Option<Vec3> {
        self.nodes.pop_front()
    }

    /// Number of waypoints left
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether navigation is over
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the front waypoint is also the last one
    #[must_use]
    pub fn is_final_leg(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Iterate over the remaining waypoints
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.nodes.iter()
    }

    /// Total length of the remaining polyline
    #[must_use]
    pub fn length(&self) -> f32 {
        self.nodes
            .iter()
            .zip(self.nodes.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }

    /// Drop every waypoint
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Copy the waypoints into a vector
    #[must_use]
    pub fn to_vec(&self) -> Vec<Vec3> {
        self.nodes.iter().copied().collect()
    }
}

impl From<Vec<Vec3>> for Path {
    fn from(nodes: Vec<Vec3>) -> Self {
        Self {
            nodes: nodes.into(),
        }
    }
}

impl FromIterator<Vec3> for Path {
    fn from_iter<I: IntoIterator<Item = Vec3>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
