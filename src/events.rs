//! Broadcast of controller state transitions.
//!
//! The controller emits via [`EventBus::emit`]; renderers and tests
//! subscribe via [`EventBus::subscribe`]. Built on [`tokio::sync::broadcast`]
//! so several listeners can follow the same controller.

use tokio::sync::broadcast;

use crate::controller::StateKind;

/// Something observable happened in a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The interaction state moved from one kind to another.
    Transition { from: StateKind, to: StateKind },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Returns the number of receivers that will see the event.
    pub fn emit(&self, event: Event) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Future events only; nothing is replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}
