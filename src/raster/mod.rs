//! Software rasterization of shapes, brush segments and text into the document raster.
//!
//! Everything is sampled at integer pixel coordinates: pixel `(x, y)` is treated as the
//! unit square centered on the point `(x, y)` in image space.

mod glyphs;
mod paint;

pub use glyphs::{TextLayout, draw_text, layout_text};
pub use paint::{
    blit_image, dash_polyline, ellipse_points, fill_polygon, rect_points, stroke_polyline,
};

use egui::{Color32, Rect};
use image::RgbImage;

use crate::style::FillStyle;

/// The document's pixel buffer: height × width × RGB, 8 bits per channel.
pub type Raster = RgbImage;

/// Per-pixel coverage in `0.0..=1.0` over a window of the raster.
///
/// Overlapping primitives combine with `max`, so a stroke drawn from several pieces never
/// darkens where the pieces overlap.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    left: i64,
    top: i64,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl CoverageMask {
    /// A mask over the pixels of a `raster_width` × `raster_height` raster touched by
    /// `bounds`. `None` when `bounds` lies entirely outside the raster.
    pub fn covering(raster_width: u32, raster_height: u32, bounds: Rect) -> Option<Self> {
        if raster_width == 0 || raster_height == 0 || !bounds.is_finite() {
            return None;
        }
        let left = (bounds.min.x.floor() as i64 - 1).max(0);
        let top = (bounds.min.y.floor() as i64 - 1).max(0);
        let right = (bounds.max.x.ceil() as i64 + 1).min(raster_width as i64 - 1);
        let bottom = (bounds.max.y.ceil() as i64 + 1).min(raster_height as i64 - 1);
        if right < left || bottom < top {
            return None;
        }
        let width = (right - left + 1) as usize;
        let height = (bottom - top + 1) as usize;
        Some(Self {
            left,
            top,
            width,
            height,
            data: vec![0.0; width * height],
        })
    }

    pub fn coverage(&self, x: i64, y: i64) -> f32 {
        if x < self.left || y < self.top {
            return 0.0;
        }
        let (cx, cy) = ((x - self.left) as usize, (y - self.top) as usize);
        if cx >= self.width || cy >= self.height {
            return 0.0;
        }
        self.data[cy * self.width + cx]
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|c| *c <= 0.0)
    }

    fn right(&self) -> i64 {
        self.left + self.width as i64 - 1
    }

    fn bottom(&self) -> i64 {
        self.top + self.height as i64 - 1
    }

    fn accumulate(&mut self, x: i64, y: i64, coverage: f32) {
        if coverage <= 0.0 || x < self.left || y < self.top || x > self.right() || y > self.bottom()
        {
            return;
        }
        let index = (y - self.top) as usize * self.width + (x - self.left) as usize;
        let slot = &mut self.data[index];
        *slot = slot.max(coverage.min(1.0));
    }

    /// Pixel ranges of `rect` clipped to the mask window.
    fn clip(&self, rect: Rect) -> Option<(std::ops::RangeInclusive<i64>, std::ops::RangeInclusive<i64>)> {
        let x0 = (rect.min.x.floor() as i64).max(self.left);
        let y0 = (rect.min.y.floor() as i64).max(self.top);
        let x1 = (rect.max.x.ceil() as i64).min(self.right());
        let y1 = (rect.max.y.ceil() as i64).min(self.bottom());
        (x0 <= x1 && y0 <= y1).then_some((x0..=x1, y0..=y1))
    }

    /// Accumulates `coverage(x, y)` for every pixel in `rect`.
    pub(crate) fn shade(&mut self, rect: Rect, coverage: impl Fn(f32, f32) -> f32) {
        let Some((xs, ys)) = self.clip(rect) else {
            return;
        };
        for y in ys {
            for x in xs.clone() {
                let c = coverage(x as f32, y as f32);
                self.accumulate(x, y, c);
            }
        }
    }

    /// Adds a horizontal span `[x0, x1]` on row `y` weighted by `weight`, with exact
    /// coverage for the partially covered end pixels.
    pub(crate) fn add_span(&self, row: &mut [f32], x0: f32, x1: f32, weight: f32) {
        if x1 <= x0 {
            return;
        }
        let first = ((x0 + 0.5).floor() as i64).max(self.left);
        let last = ((x1 + 0.5).floor() as i64).min(self.right());
        for px in first..=last {
            let overlap = x1.min(px as f32 + 0.5) - x0.max(px as f32 - 0.5);
            if overlap > 0.0 {
                row[(px - self.left) as usize] += overlap * weight;
            }
        }
    }

    pub(crate) fn row_range(&self) -> std::ops::RangeInclusive<i64> {
        self.top..=self.bottom()
    }

    pub(crate) fn row_buffer(&self) -> Vec<f32> {
        vec![0.0; self.width]
    }

    pub(crate) fn merge_row(&mut self, y: i64, row: &[f32]) {
        for (i, c) in row.iter().enumerate() {
            self.accumulate(self.left + i as i64, y, *c);
        }
    }

    /// Blends `color` into `raster` wherever the mask has coverage and `pattern` paints.
    ///
    /// `dst = src * a * coverage + dst * (1 - a * coverage)` per channel.
    pub fn composite(&self, raster: &mut Raster, color: Color32, pattern: FillStyle) {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let alpha = a as f32 / 255.0;
        if alpha <= 0.0 {
            return;
        }
        let src = [r as f32, g as f32, b as f32];
        for cy in 0..self.height {
            for cx in 0..self.width {
                let coverage = self.data[cy * self.width + cx];
                if coverage <= 0.0 {
                    continue;
                }
                let (x, y) = (self.left + cx as i64, self.top + cy as i64);
                if !pattern.covers(x, y) {
                    continue;
                }
                let t = alpha * coverage;
                let pixel = raster.get_pixel_mut(x as u32, y as u32);
                for (channel, s) in pixel.0.iter_mut().zip(src) {
                    *channel = (s * t + *channel as f32 * (1.0 - t)).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}

/// Coverage of a pixel center at distance `distance` from the edge of a shape whose
/// boundary lies `half_width` away from its skeleton.
#[inline]
pub(crate) fn edge_coverage(half_width: f32, distance: f32) -> f32 {
    (half_width + 0.5 - distance).clamp(0.0, 1.0)
}
