use std::sync::OnceLock;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont, point};
use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

use super::{CoverageMask, Raster};
use crate::style::{FillStyle, FontSpec};

/// Width of one character relative to the font size when no font could be loaded
const FALLBACK_ADVANCE: f32 = 0.6;
/// Line height relative to the font size when no font could be loaded
const FALLBACK_LINE_HEIGHT: f32 = 1.2;

static PROPORTIONAL: OnceLock<Option<FontVec>> = OnceLock::new();
static MONOSPACE: OnceLock<Option<FontVec>> = OnceLock::new();

/// Loads one of the fonts egui embeds by default.
fn load_builtin(name: &str) -> Option<FontVec> {
    let definitions = egui::FontDefinitions::default();
    let Some(data) = definitions.font_data.get(name) else {
        log::warn!("Built-in font {name} is not available; text will not be rasterized");
        return None;
    };
    match FontVec::try_from_vec_and_index(data.font.to_vec(), data.index) {
        Ok(font) => Some(font),
        Err(err) => {
            log::error!("Failed to parse built-in font {name}: {err}");
            None
        }
    }
}

fn font_for(font_spec: &FontSpec) -> Option<&'static FontVec> {
    if font_spec.is_monospace() {
        MONOSPACE.get_or_init(|| load_builtin("Hack")).as_ref()
    } else {
        PROPORTIONAL.get_or_init(|| load_builtin("Ubuntu-Light")).as_ref()
    }
}

/// Positioned glyphs of a (possibly multi-line) string.
#[derive(Debug, Clone, Default)]
pub struct TextLayout {
    /// Glyph ids with their baseline origin relative to the text's top-left corner
    glyphs: Vec<(GlyphId, Pos2)>,
    size: Vec2,
}

impl TextLayout {
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn bounds_at(&self, top_left: Pos2) -> Rect {
        Rect::from_min_size(top_left, self.size)
    }
}

/// Lays out `text` left-aligned, one line per `\n`.
pub fn layout_text(text: &str, font_spec: &FontSpec) -> TextLayout {
    let line_count = text.split('\n').count().max(1);
    let Some(font) = font_for(font_spec) else {
        let longest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
        return TextLayout {
            glyphs: Vec::new(),
            size: vec2(
                longest as f32 * FALLBACK_ADVANCE * font_spec.size,
                line_count as f32 * FALLBACK_LINE_HEIGHT * font_spec.size,
            ),
        };
    };

    let scaled = font.as_scaled(PxScale::from(font_spec.size));
    let line_height = scaled.height() + scaled.line_gap();
    let mut glyphs = Vec::new();
    let mut width = 0.0_f32;

    for (index, line) in text.split('\n').enumerate() {
        let baseline = scaled.ascent() + index as f32 * line_height;
        let mut cursor = 0.0_f32;
        let mut previous: Option<GlyphId> = None;
        for ch in line.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                cursor += scaled.kern(prev, id);
            }
            glyphs.push((id, pos2(cursor, baseline)));
            cursor += scaled.h_advance(id);
            previous = Some(id);
        }
        width = width.max(cursor);
    }

    TextLayout {
        glyphs,
        size: vec2(width.ceil(), (line_count as f32 * line_height).ceil()),
    }
}

/// Rasterizes `text` with its top-left corner at `top_left`.
pub fn draw_text(raster: &mut Raster, text: &str, font_spec: &FontSpec, color: Color32, top_left: Pos2) {
    let Some(font) = font_for(font_spec) else {
        return;
    };
    let layout = layout_text(text, font_spec);
    let bounds = layout.bounds_at(top_left).expand(font_spec.size);
    let Some(mut mask) = CoverageMask::covering(raster.width(), raster.height(), bounds) else {
        return;
    };
    let scale = PxScale::from(font_spec.size);
    for (id, origin) in &layout.glyphs {
        let glyph = id.with_scale_and_position(scale, point(top_left.x + origin.x, top_left.y + origin.y));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let px = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let x = px.min.x as i64 + gx as i64;
            let y = px.min.y as i64 + gy as i64;
            mask.accumulate(x, y, coverage);
        });
    }
    mask.composite(raster, color, FillStyle::Solid);
}
