//! Navigation event queue
//!
//! Steering controllers record what happened to their path during a tick.
//! The ECS layer tags those records with the agent entity and pushes them
//! into a double-buffered queue, so subscribers (UI, audio, debug overlays)
//! see a frame-consistent view. Nothing in the steering logic depends on
//! whether anyone reads the queue.
//!
//! # Example
//!
//! ```ignore
//! // During the frame
//! steer_agents(&mut world, &mut physics, &mut events, dt);
//!
//! // Next frame
//! events.swap();
//! for event in events.iter() {
//!     if let SteeringEvent::PathCompleted { destination } = event.event {
//!         log::info!("{:?} arrived at {destination}", event.entity);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

/// Something that happened to an agent's path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum SteeringEvent {
    /// A new non-empty path was installed
    PathAssigned {
        /// Number of waypoints in the new path
        nodes: usize,
        /// Last waypoint of the new path
        destination: Vec3,
    },

    /// An intermediate waypoint was reached and consumed
    NodeReached {
        /// The consumed waypoint
        position: Vec3,
        /// Waypoints left after consumption
        remaining: usize,
    },

    /// The final waypoint was reached and the agent came to rest
    PathCompleted {
        /// The final waypoint
        destination: Vec3,
    },

    /// An in-flight path was dropped before completion
    PathCleared {
        /// Waypoints that were never reached
        abandoned: usize,
    },
}

/// A steering event tagged with the agent it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct AgentEvent {
    /// The agent entity
    pub entity: Entity,
    /// What happened
    pub event: SteeringEvent,
}

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during frame N are available for reading during frame N+1.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<AgentEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<AgentEvent>,
}

impl EventQueue {
    const DEFAULT_CAPACITY: usize = 32;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: AgentEvent) {
        self.pending.push_back(event);
    }

    /// Push every event an agent recorded this frame.
    pub fn extend(&mut self, entity: Entity, events: impl IntoIterator<Item = SteeringEvent>) {
        self.pending
            .extend(events.into_iter().map(|event| AgentEvent { entity, event }));
    }

    /// Swap the pending and processing queues.
    ///
    /// Call once per frame. Events from the frame before last are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &AgentEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = AgentEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events pending for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear both buffers.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
