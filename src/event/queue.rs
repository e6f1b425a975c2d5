use std::collections::VecDeque;

use super::{Event, EventKind};

/// FIFO queue connecting every component of a simulation.
///
/// Events are stored by value and handed back by [EventQueue::pop], each event is consumed exactly
/// once. Insertion order is the only ordering guarantee.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: impl Into<Event>) {
        self.inner.push_back(event.into());
    }

    pub fn front(&self) -> Option<&Event> {
        self.inner.front()
    }

    pub fn front_kind(&self) -> Option<EventKind> {
        self.inner.front().map(Event::kind)
    }

    /// Removes the event at the head of the queue.
    ///
    /// Callers must check [EventQueue::is_empty] first, popping an empty queue is a bug in the
    /// caller and panics.
    pub fn pop(&mut self) -> Event {
        match self.inner.pop_front() {
            Some(event) => event,
            None => panic!("Popped an empty event queue"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
