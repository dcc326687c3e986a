mod bus;
mod events;
mod handlers;

pub use bus::{EventBus, SubscriptionId};
pub use events::{CanvasEvent, CursorHint};
pub use handlers::{EventLog, LogHandler};

/// Receives notifications published by the canvas
pub trait EventHandler: Send {
    fn handle_event(&mut self, event: &CanvasEvent);
}
