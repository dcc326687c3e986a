use std::sync::Arc;

use egui::{Pos2, Rect, vec2};

use super::Element;
use crate::raster::{Raster, blit_image};

/// A pasted or inserted picture floating over the raster.
///
/// The pixel buffer is shared read-only, so copies of the item are cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub pixels: Arc<Raster>,
}

impl EmbeddedImage {
    pub fn new(pixels: Arc<Raster>) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

impl Element for EmbeddedImage {
    fn kind_name(&self) -> &'static str {
        "image"
    }

    fn local_bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(self.width() as f32, self.height() as f32))
    }

    fn contains_local(&self, point: Pos2) -> bool {
        self.local_bounds().contains(point)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        blit_image(raster, &self.pixels, anchor);
    }
}
