//! Definition of [`PendingEvents`].

use std::collections::VecDeque;

use crate::event::Event;

/// Events already taken from the queue but not yet delivered, in arrival order.
///
/// Owned by the scheduler alone. Conceptually it sits in front of the queue:
/// everything here arrived before anything still in the queue.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: VecDeque<Event>,
}

impl PendingEvents {
    /// Appends an event that arrived after all pending ones.
    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Removes and returns the oldest event satisfying `filter`, keeping the order of the rest.
    pub fn take_matching(&mut self, filter: Option<&str>) -> Option<Event> {
        let index = self.events.iter().position(|event| event.matches(filter))?;
        self.events.remove(index)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Checks if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops every pending event, releasing deferred payloads. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }
}
