use egui::{Pos2, Rect, Vec2};

use crate::element::ShapeId;

/// Move-tool drag of the selected shapes
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    /// Image point where the button went down
    pub press: Pos2,
    pub ids: Vec<ShapeId>,
}

impl DragGesture {
    pub fn offset_to(&self, point: Pos2) -> Vec2 {
        point - self.press
    }
}

/// Rectangle spanned from a fixed corner to the pointer, in image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandGesture {
    pub origin: Pos2,
    pub current: Pos2,
}

impl BandGesture {
    pub fn new(origin: Pos2) -> Self {
        Self {
            origin,
            current: origin,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_two_pos(self.origin, self.current)
    }
}
