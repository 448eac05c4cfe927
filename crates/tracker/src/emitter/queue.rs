//! FIFO queue shared between the tracking thread and the flush worker

use parking_lot::Mutex;
use std::collections::VecDeque;
use surfside_core::TrackedEvent;

/// Bounded FIFO of pending events
///
/// Any thread may push; only the flush worker (serialised by the emitter's
/// flush lock) takes from or requeues at the head.
#[derive(Debug)]
pub struct EventQueue {
    events: Mutex<VecDeque<TrackedEvent>>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Append an event, evicting and returning the oldest one when full
    pub fn push(&self, event: TrackedEvent) -> Option<TrackedEvent> {
        let mut events = self.events.lock();
        let evicted = if events.len() >= self.capacity {
            events.pop_front()
        } else {
            None
        };
        events.push_back(event);
        evicted
    }

    /// Remove up to `max` events from the head; `0` takes everything
    pub fn take_front(&self, max: usize) -> Vec<TrackedEvent> {
        let mut events = self.events.lock();
        let count = if max == 0 {
            events.len()
        } else {
            max.min(events.len())
        };
        events.drain(..count).collect()
    }

    /// Put a failed batch back at the head, preserving its order
    ///
    /// Events tracked while the batch was in flight may have filled the
    /// queue. The batch keeps its place and the oldest events behind it are
    /// evicted until the queue is back within capacity; those are returned.
    pub fn requeue_front(&self, batch: Vec<TrackedEvent>) -> Vec<TrackedEvent> {
        let mut events = self.events.lock();
        let head = batch.len();
        for event in batch.into_iter().rev() {
            events.push_front(event);
        }
        let excess = events.len().saturating_sub(self.capacity.max(head));
        let end = (head + excess).min(events.len());
        events.drain(head..end).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of the pending events, oldest first
    pub fn snapshot(&self) -> Vec<TrackedEvent> {
        self.events.lock().iter().cloned().collect()
    }
}
