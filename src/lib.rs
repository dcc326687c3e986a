#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod filters;
pub mod geometry;
pub mod history;
pub mod input;
pub mod io;
pub mod raster;
pub mod style;
pub mod tools;
pub mod viewport;

pub use app::PaintApp;
pub use canvas::{Canvas, EventOutcome};
pub use clipboard::{ImageClipboard, StaticClipboard};
pub use config::{ConfigError, EditorConfig, ZoomSettings};
pub use document::Document;
pub use element::{ShapeId, ShapeItem, ShapeKind};
pub use error::{EditorError, EditorResult};
pub use event::{CanvasEvent, CursorHint, EventBus, EventHandler, EventLog};
pub use geometry::ViewTransform;
pub use history::{History, HistoryEntry};
pub use input::{InputEvent, InputHandler, InputModifiers};
pub use raster::Raster;
pub use style::ToolStyle;
pub use tools::{Gesture, ToolKind};
pub use viewport::Viewport;
