use egui::Pos2;
use serde::{Deserialize, Serialize};

mod brush;
mod selection;
mod shapes;

pub use brush::{AxisLock, BrushStroke};
pub use selection::{BandGesture, DragGesture};
pub use shapes::{PathDraft, PolygonDraft, ShapeDraft, ShapeTool, ellipse_rect, rectangle_rect};

use crate::event::CursorHint;
use crate::viewport::ZoomDrag;

/// The tools the canvas understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Move,
    Brush,
    Text,
    Crop,
    Zoom,
    Eyedropper,
    Ellipse,
    Rectangle,
    Line,
    Path,
    Pixmap,
    Polygon,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        ToolKind::Move,
        ToolKind::Brush,
        ToolKind::Text,
        ToolKind::Crop,
        ToolKind::Zoom,
        ToolKind::Eyedropper,
        ToolKind::Ellipse,
        ToolKind::Rectangle,
        ToolKind::Line,
        ToolKind::Path,
        ToolKind::Pixmap,
        ToolKind::Polygon,
    ];

    /// Return the name of the tool
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Move => "move",
            ToolKind::Brush => "brush",
            ToolKind::Text => "text",
            ToolKind::Crop => "crop",
            ToolKind::Zoom => "zoom",
            ToolKind::Eyedropper => "eyedropper",
            ToolKind::Ellipse => "circle",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Line => "line",
            ToolKind::Path => "path",
            ToolKind::Pixmap => "pixmap",
            ToolKind::Polygon => "polygon",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Move => "Move",
            ToolKind::Brush => "Brush",
            ToolKind::Text => "Text",
            ToolKind::Crop => "Crop",
            ToolKind::Zoom => "Zoom",
            ToolKind::Eyedropper => "Eyedropper",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Line => "Line",
            ToolKind::Path => "Path",
            ToolKind::Pixmap => "Pixmap",
            ToolKind::Polygon => "Polygon",
        }
    }

    /// Factory lookup by name; "ellipse" is accepted next to "circle"
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "ellipse" {
            return Some(ToolKind::Ellipse);
        }
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Cursor shown while the tool is idle over the canvas
    pub fn cursor(self) -> CursorHint {
        match self {
            ToolKind::Move => CursorHint::Arrow,
            ToolKind::Brush => CursorHint::Blank,
            ToolKind::Text => CursorHint::IBeam,
            ToolKind::Zoom => CursorHint::Help,
            ToolKind::Crop
            | ToolKind::Eyedropper
            | ToolKind::Ellipse
            | ToolKind::Rectangle
            | ToolKind::Line
            | ToolKind::Path
            | ToolKind::Pixmap
            | ToolKind::Polygon => CursorHint::Crosshair,
        }
    }

    pub fn shape_tool(self) -> Option<ShapeTool> {
        match self {
            ToolKind::Ellipse => Some(ShapeTool::Ellipse),
            ToolKind::Rectangle => Some(ShapeTool::Rectangle),
            ToolKind::Line => Some(ShapeTool::Line),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Transient state between a press and its release.
///
/// At most one gesture is active. Switching tools or pressing Escape drops it without
/// touching the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Shape(ShapeDraft),
    Path(PathDraft),
    Brush(BrushStroke),
    /// Alt+right drag changing the brush size
    BrushResize { last_x: f32 },
    Crop(BandGesture),
    Zoom(ZoomDrag),
    Drag(DragGesture),
    RubberBand(BandGesture),
    /// Space held: pointer drags pan the view
    Pan { last_view: Pos2 },
    /// Pixmap placement waiting for the release point
    Pixmap,
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            Gesture::Idle => "Idle",
            Gesture::Shape(_) => "Shape",
            Gesture::Path(_) => "Path",
            Gesture::Brush(_) => "Brush",
            Gesture::BrushResize { .. } => "BrushResize",
            Gesture::Crop(_) => "Crop",
            Gesture::Zoom(_) => "Zoom",
            Gesture::Drag(_) => "Drag",
            Gesture::RubberBand(_) => "RubberBand",
            Gesture::Pan { .. } => "Pan",
            Gesture::Pixmap => "Pixmap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
        }
        assert_eq!(ToolKind::from_name("Ellipse"), Some(ToolKind::Ellipse));
        assert_eq!(ToolKind::from_name("lasso"), None);
    }
}
