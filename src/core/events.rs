use crate::collision::Contact;
use crate::core::{BodyHandle, ShapeHandle};
use std::collections::VecDeque;

/// Types of collision events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Shapes touched this step but not the step before
    Begin,

    /// Shapes touched this step and the step before
    Persist,

    /// Shapes touched last step but not this one
    End,
}

/// A collision event between two shapes, in narrow-phase order
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// The type of collision event
    pub event_type: CollisionEventType,

    /// The first shape of the pair (the normal points away from it)
    pub shape_a: ShapeHandle,

    /// The second shape of the pair
    pub shape_b: ShapeHandle,

    /// Body owning `shape_a`
    pub body_a: BodyHandle,

    /// Body owning `shape_b`
    pub body_b: BodyHandle,

    /// Contact points (empty for End events)
    pub contacts: Vec<Contact>,
}

impl CollisionEvent {
    /// Returns true if the event concerns the given shape
    pub fn involves_shape(&self, shape: ShapeHandle) -> bool {
        self.shape_a == shape || self.shape_b == shape
    }

    /// Returns true if the event concerns the given body
    pub fn involves_body(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }
}

/// Collision events produced by the most recent step
#[derive(Debug, Default)]
pub struct EventQueue {
    collision_events: VecDeque<CollisionEvent>,
}

impl EventQueue {
    /// Creates a new empty event queue
    pub fn new() -> Self {
        Self {
            collision_events: VecDeque::new(),
        }
    }

    /// Adds a collision event to the queue
    pub fn add_collision_event(&mut self, event: CollisionEvent) {
        self.collision_events.push_back(event);
    }

    /// Iterates over the queued events without consuming them
    pub fn iter(&self) -> impl Iterator<Item = &CollisionEvent> + '_ {
        self.collision_events.iter()
    }

    /// Returns the number of queued events
    pub fn len(&self) -> usize {
        self.collision_events.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.collision_events.is_empty()
    }

    /// Clears all events from the queue
    pub fn clear(&mut self) {
        self.collision_events.clear();
    }

    /// Gets all collision events of a specific type
    pub fn get_collision_events_of_type(&self, event_type: CollisionEventType) -> Vec<&CollisionEvent> {
        self.collision_events
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}
