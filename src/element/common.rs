use egui::{Pos2, Rect};

use crate::style::Pen;

/// Extra distance in image pixels around thin outlines that still counts as a hit
pub const HIT_TOLERANCE: f32 = 3.0;

/// Z-value of items placed directly over the raster (text, pasted images)
pub const OVERLAY_Z: f32 = 1.0;

/// Half the visible outline width, or zero when the pen draws nothing.
pub(crate) fn outline_half_width(pen: &Pen) -> f32 {
    if pen.is_visible() {
        pen.effective_width() / 2.0
    } else {
        0.0
    }
}

/// Pointer slack for outline hit tests.
pub(crate) fn hit_slack(pen: &Pen) -> f32 {
    outline_half_width(pen).max(HIT_TOLERANCE)
}

/// Grows a geometric rectangle by the outline of `pen`.
pub(crate) fn outline_bounds(rect: Rect, pen: &Pen) -> Rect {
    rect.expand(outline_half_width(pen))
}

pub(crate) fn shifted(points: &[Pos2], anchor: Pos2) -> Vec<Pos2> {
    points.iter().map(|p| anchor + p.to_vec2()).collect()
}
