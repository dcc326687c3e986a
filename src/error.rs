use thiserror::Error;

/// Errors produced by canvas operations and gesture handlers.
///
/// None of these escape [`crate::Canvas::handle_event`]: the dispatch boundary logs them
/// and reports them back as [`crate::EventOutcome::Abandoned`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EditorError {
    /// No document is open
    #[error("no image loaded")]
    NoImage,

    /// A crop selection that is empty once clamped to the raster
    #[error("crop rectangle is empty after clamping to the image ({width}x{height})")]
    EmptyCrop { width: i64, height: i64 },

    /// Polygon finished with too few points
    #[error("polygon needs at least 3 points, got {0}")]
    NotEnoughPoints(usize),

    /// Path released without any movement
    #[error("path needs the pointer to move while the button is held")]
    EmptyPath,

    /// A shape gesture that collapsed to nothing
    #[error("{0} has no extent")]
    DegenerateShape(&'static str),

    /// Text tool confirmed with an empty string
    #[error("text is empty")]
    EmptyText,

    /// Text submitted while no text placement was pending
    #[error("no text placement is pending")]
    NoPendingText,

    /// No shape with the given id
    #[error("no shape at the pointer")]
    NoShape,

    /// Clipboard unavailable or without image content
    #[error("clipboard has no image")]
    ClipboardEmpty,

    /// Pixmap tool used before a pixmap was chosen
    #[error("no pixmap selected for insertion")]
    NoPixmap,

    /// Sample point outside the raster
    #[error("point ({x}, {y}) is outside the image")]
    OutOfBounds { x: f32, y: f32 },

    /// A filter returned a buffer with no pixels
    #[error("filter produced an empty image")]
    EmptyImage,

    /// Pointer release without a matching press
    #[error("pointer released without a matching press")]
    UnmatchedRelease,

    /// Anything else that went wrong inside a gesture
    #[error("gesture failed: {0}")]
    GestureFailed(String),
}

impl EditorError {
    /// Invalid input and missing resources are expected in normal use and logged as
    /// warnings; everything else is an error.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Self::GestureFailed(_) | Self::EmptyImage)
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
