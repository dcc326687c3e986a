use egui::{Color32, Pos2, Rect};

use super::Element;
use crate::raster::{Raster, draw_text, layout_text};
use crate::style::FontSpec;

#[derive(Debug, Clone, PartialEq)]
pub struct TextShape {
    pub text: String,
    pub font: FontSpec,
    pub color: Color32,
}

impl TextShape {
    pub fn new(text: impl Into<String>, font: FontSpec, color: Color32) -> Self {
        Self {
            text: text.into(),
            font,
            color,
        }
    }
}

impl Element for TextShape {
    fn kind_name(&self) -> &'static str {
        "text"
    }

    fn local_bounds(&self) -> Rect {
        layout_text(&self.text, &self.font).bounds_at(Pos2::ZERO)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        self.local_bounds().contains(point)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        draw_text(raster, &self.text, &self.font, self.color, anchor);
    }
}
