use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};

/// Mapping between view (widget) coordinates and image coordinates.
///
/// A view point is obtained from an image point by shifting it by the raster layer's
/// local offset, scaling it and finally shifting it by the pan offset:
///
/// `view = (image + layer_offset) * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// View pixels per image pixel
    pub scale: f32,
    /// Pan offset in view pixels
    pub offset: Vec2,
    /// Position of the raster layer inside the scene
    pub layer_offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            layer_offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn new(scale: f32, offset: Vec2) -> Self {
        Self {
            scale,
            offset,
            layer_offset: Vec2::ZERO,
        }
    }

    pub fn to_image_space(&self, view: Pos2) -> Pos2 {
        pos2(
            (view.x - self.offset.x) / self.scale - self.layer_offset.x,
            (view.y - self.offset.y) / self.scale - self.layer_offset.y,
        )
    }

    pub fn to_view_space(&self, image: Pos2) -> Pos2 {
        pos2(
            (image.x + self.layer_offset.x) * self.scale + self.offset.x,
            (image.y + self.layer_offset.y) * self.scale + self.offset.y,
        )
    }

    pub fn rect_to_view(&self, image: Rect) -> Rect {
        Rect::from_two_pos(self.to_view_space(image.min), self.to_view_space(image.max))
    }

    /// Multiplies the scale by `factor` keeping the image point under `view_anchor` fixed.
    pub fn zoom_around(&mut self, view_anchor: Pos2, factor: f32) {
        let image_anchor = self.to_image_space(view_anchor);
        self.scale *= factor;
        let moved = self.to_view_space(image_anchor);
        self.offset += view_anchor - moved;
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }
}
