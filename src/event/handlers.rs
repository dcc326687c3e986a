use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{CanvasEvent, EventHandler};

/// Collects events so they can be read after the canvas call returns.
///
/// Clones share the same buffer: subscribe one clone and keep the other.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<CanvasEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all collected events, oldest first.
    pub fn drain(&self) -> Vec<CanvasEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn events(&self) -> Vec<CanvasEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventHandler for EventLog {
    fn handle_event(&mut self, event: &CanvasEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Writes every event to the log at debug level
#[derive(Debug, Default)]
pub struct LogHandler;

impl EventHandler for LogHandler {
    fn handle_event(&mut self, event: &CanvasEvent) {
        log::debug!("Canvas event: {event:?}");
    }
}
