use egui::{Color32, CursorIcon, Pos2};

use crate::tools::ToolKind;

/// Pointer cursor the canvas asks the host to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Arrow,
    OpenHand,
    ClosedHand,
    PointingHand,
    Crosshair,
    IBeam,
    /// Hidden, the brush outline replaces it
    Blank,
    Help,
}

impl CursorHint {
    pub fn to_egui(self) -> CursorIcon {
        match self {
            CursorHint::Arrow => CursorIcon::Default,
            CursorHint::OpenHand => CursorIcon::Grab,
            CursorHint::ClosedHand => CursorIcon::Grabbing,
            CursorHint::PointingHand => CursorIcon::PointingHand,
            CursorHint::Crosshair => CursorIcon::Crosshair,
            CursorHint::IBeam => CursorIcon::Text,
            CursorHint::Blank => CursorIcon::None,
            CursorHint::Help => CursorIcon::Help,
        }
    }
}

/// Notifications from the canvas to the surrounding UI
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Zoom level in percent
    ZoomChanged {
        percent: f32,
    },
    ColorPicked(Color32),
    UndoAvailable(bool),
    RedoAvailable(bool),
    CursorChanged(CursorHint),
    ToolChanged {
        old: ToolKind,
        new: ToolKind,
    },
    /// The text tool was clicked; answer with `submit_text` or `cancel_text`
    TextRequested {
        position: Pos2,
    },
    /// The raster was replaced or repainted
    ImageChanged {
        width: u32,
        height: u32,
    },
    BrushSizeChanged(u32),
}
