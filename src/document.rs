use egui::{Color32, Pos2, Rect, Vec2, vec2};
use image::imageops;

use crate::element::{ShapeId, ShapeItem};
use crate::error::{EditorError, EditorResult};
use crate::raster::{Raster, ellipse_points, fill_polygon, rect_points, stroke_polyline};
use crate::style::{CapStyle, Fill, JoinStyle, Pen, PenStyle};

/// Pen of the transient outline shown while a shape gesture is in progress
pub const PREVIEW_PEN: Pen = Pen {
    color: Color32::BLACK,
    width: 2.0,
    style: PenStyle::Solid,
    cap: CapStyle::Square,
    join: JoinStyle::Bevel,
};

/// Pen of rubber bands and selection frames
const FRAME_PEN: Pen = Pen {
    color: Color32::from_rgb(60, 60, 60),
    width: 1.0,
    style: PenStyle::Dash,
    cap: CapStyle::Flat,
    join: JoinStyle::Miter,
};

/// One brush segment waiting to be rasterized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSegment {
    pub from: Pos2,
    pub to: Pos2,
    pub pen: Pen,
}

/// Transient geometry drawn over the document while a gesture is active. Never part of
/// the document content.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Ellipse(Rect),
    Rectangle(Rect),
    Line(Pos2, Pos2),
    Path(Vec<Pos2>),
    Polygon(Vec<Pos2>),
    Crop(Rect),
    RubberBand(Rect),
}

/// Outline of the brush following the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushCursor {
    pub center: Pos2,
    pub diameter: f32,
    pub color: Color32,
}

/// What to draw on top of the raster when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub include_pending: bool,
    pub include_selection: bool,
    pub include_preview: bool,
}

impl RenderOptions {
    /// Document content only
    pub const FLATTEN: Self = Self {
        include_pending: false,
        include_selection: false,
        include_preview: false,
    };

    /// Everything the user currently sees
    pub const LIVE: Self = Self {
        include_pending: true,
        include_selection: true,
        include_preview: true,
    };
}

/// Integer pixel rectangle inside the raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The open image: one raster layer plus the vector shapes floating over it.
#[derive(Debug, Clone)]
pub struct Document {
    raster: Raster,
    shapes: Vec<ShapeItem>,
    pending: Vec<BrushSegment>,
    preview: Option<Preview>,
    brush_cursor: Option<BrushCursor>,
}

impl Document {
    pub fn new(raster: Raster) -> Self {
        Self {
            raster,
            shapes: Vec::new(),
            pending: Vec::new(),
            preview: None,
            brush_cursor: None,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn set_raster(&mut self, raster: Raster) {
        self.raster = raster;
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Raster extent in image space
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(self.width() as f32, self.height() as f32))
    }

    // --- shapes ---

    pub fn shapes(&self) -> &[ShapeItem] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> impl Iterator<Item = &mut ShapeItem> {
        self.shapes.iter_mut()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&ShapeItem> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut ShapeItem> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    pub fn add_shape(&mut self, item: ShapeItem) -> ShapeId {
        let id = item.id();
        log::debug!("Added {} {id}", item.kind_name());
        self.shapes.push(item);
        id
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<ShapeItem> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        Some(self.shapes.remove(index))
    }

    pub fn remove_selected(&mut self) -> Vec<ShapeItem> {
        let (removed, kept) = std::mem::take(&mut self.shapes)
            .into_iter()
            .partition(|s| s.is_selected());
        self.shapes = kept;
        removed
    }

    pub fn retain_shapes(&mut self, keep: impl FnMut(&ShapeItem) -> bool) {
        self.shapes.retain(keep);
    }

    pub fn translate_shapes(&mut self, delta: Vec2) {
        for shape in &mut self.shapes {
            shape.translate(delta);
        }
    }

    pub fn selected_ids(&self) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|s| s.is_selected())
            .map(|s| s.id())
            .collect()
    }

    /// Shapes in drawing order: ascending z, insertion order among equal z.
    pub fn shapes_in_z_order(&self) -> Vec<&ShapeItem> {
        let mut ordered: Vec<&ShapeItem> = self.shapes.iter().collect();
        ordered.sort_by(|a, b| a.z().total_cmp(&b.z()));
        ordered
    }

    /// Topmost shape under `point`.
    pub fn top_shape_at(&self, point: Pos2) -> Option<ShapeId> {
        self.shapes_in_z_order()
            .into_iter()
            .rev()
            .find(|s| s.hit_test(point))
            .map(|s| s.id())
    }

    pub fn shapes_intersecting(&self, rect: Rect) -> Vec<ShapeId> {
        self.shapes
            .iter()
            .filter(|s| s.bounding_box().intersects(rect))
            .map(|s| s.id())
            .collect()
    }

    // --- brush ---

    pub fn push_brush_segment(&mut self, segment: BrushSegment) {
        self.pending.push(segment);
    }

    pub fn pending_segments(&self) -> &[BrushSegment] {
        &self.pending
    }

    /// Rasterizes pending segments in submission order, each with its own pen, and
    /// clears them. Returns how many were drawn.
    pub fn commit_brush_stroke(&mut self) -> usize {
        let count = self.pending.len();
        for segment in self.pending.drain(..) {
            stroke_polyline(&mut self.raster, &[segment.from, segment.to], false, &segment.pen);
        }
        count
    }

    pub fn discard_brush_stroke(&mut self) {
        self.pending.clear();
    }

    // --- transient overlays ---

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn set_preview(&mut self, preview: Preview) {
        self.preview = Some(preview);
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }

    pub fn brush_cursor(&self) -> Option<&BrushCursor> {
        self.brush_cursor.as_ref()
    }

    pub fn set_brush_cursor(&mut self, cursor: Option<BrushCursor>) {
        self.brush_cursor = cursor;
    }

    // --- pixels ---

    /// Color of the pixel containing `point`.
    pub fn sample(&self, point: Pos2) -> EditorResult<Color32> {
        let (x, y) = (point.x.floor(), point.y.floor());
        if x < 0.0 || y < 0.0 || x >= self.width() as f32 || y >= self.height() as f32 {
            return Err(EditorError::OutOfBounds {
                x: point.x,
                y: point.y,
            });
        }
        let [r, g, b] = self.raster.get_pixel(x as u32, y as u32).0;
        Ok(Color32::from_rgb(r, g, b))
    }

    /// Clamps `rect` to the raster and rounds it to whole pixels.
    pub fn clamp_region(&self, rect: Rect) -> EditorResult<PixelRegion> {
        let clamped = rect.intersect(self.bounds());
        let x0 = clamped.min.x.round().max(0.0) as i64;
        let y0 = clamped.min.y.round().max(0.0) as i64;
        let x1 = (clamped.max.x.round() as i64).min(self.width() as i64);
        let y1 = (clamped.max.y.round() as i64).min(self.height() as i64);
        let (width, height) = (x1 - x0, y1 - y0);
        if width <= 0 || height <= 0 || !clamped.is_positive() {
            return Err(EditorError::EmptyCrop {
                width: width.max(0),
                height: height.max(0),
            });
        }
        Ok(PixelRegion {
            x: x0 as u32,
            y: y0 as u32,
            width: width as u32,
            height: height as u32,
        })
    }

    /// Copy of the pixels inside `region`.
    pub fn copy_region(&self, region: PixelRegion) -> Raster {
        imageops::crop_imm(&self.raster, region.x, region.y, region.width, region.height)
            .to_image()
    }

    /// Raster plus shapes in z-order, without previews or selection frames.
    pub fn flatten_to_image(&self) -> Raster {
        self.render(RenderOptions::FLATTEN)
    }

    pub fn render(&self, options: RenderOptions) -> Raster {
        let mut out = self.raster.clone();
        if options.include_pending {
            for segment in &self.pending {
                stroke_polyline(&mut out, &[segment.from, segment.to], false, &segment.pen);
            }
        }
        for shape in self.shapes_in_z_order() {
            shape.paint(&mut out);
            if options.include_selection && shape.is_selected() {
                let frame = rect_points(shape.bounding_box().expand(2.0));
                stroke_polyline(&mut out, &frame, true, &FRAME_PEN);
            }
        }
        if options.include_preview {
            if let Some(preview) = &self.preview {
                paint_preview(&mut out, preview);
            }
            if let Some(cursor) = &self.brush_cursor {
                let rect = Rect::from_center_size(cursor.center, Vec2::splat(cursor.diameter));
                let outline = ellipse_points(rect);
                fill_polygon(&mut out, &outline, &Fill::solid(cursor.color));
                stroke_polyline(&mut out, &outline, true, &Pen::new(Color32::BLACK, 1.0));
            }
        }
        out
    }
}

fn paint_preview(raster: &mut Raster, preview: &Preview) {
    match preview {
        Preview::Ellipse(rect) => stroke_polyline(raster, &ellipse_points(*rect), true, &PREVIEW_PEN),
        Preview::Rectangle(rect) => stroke_polyline(raster, &rect_points(*rect), true, &PREVIEW_PEN),
        Preview::Line(a, b) => stroke_polyline(raster, &[*a, *b], false, &PREVIEW_PEN),
        Preview::Path(points) => stroke_polyline(raster, points, false, &PREVIEW_PEN),
        Preview::Polygon(points) => stroke_polyline(raster, points, points.len() > 2, &PREVIEW_PEN),
        Preview::Crop(rect) | Preview::RubberBand(rect) => {
            stroke_polyline(raster, &rect_points(*rect), true, &FRAME_PEN)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::pos2;
    use image::Rgb;

    fn white_document() -> Document {
        Document::new(Raster::from_pixel(100, 80, Rgb([255, 255, 255])))
    }

    #[test]
    fn flatten_leaves_document_untouched() {
        let mut document = white_document();
        document.add_shape(factory::rectangle(
            Rect::from_min_max(pos2(10.0, 10.0), pos2(30.0, 30.0)),
            Pen::new(Color32::BLACK, 2.0),
            Fill::none(),
        ));
        let before = document.raster().clone();
        let flat = document.flatten_to_image();
        assert_eq!(document.raster(), &before);
        assert_eq!(flat.get_pixel(10, 20), &Rgb([0, 0, 0]));
        assert_eq!(document.shapes().len(), 1);
    }

    #[test]
    fn selection_frame_only_in_live_render() {
        let mut document = white_document();
        let mut item = factory::rectangle(
            Rect::from_min_max(pos2(20.0, 20.0), pos2(40.0, 40.0)),
            Pen::new(Color32::RED, 1.0),
            Fill::none(),
        );
        item.set_draggable(true);
        item.set_selected(true);
        document.add_shape(item);

        let flat = document.flatten_to_image();
        let live = document.render(RenderOptions::LIVE);
        // The frame sits 2.5px outside the outline
        assert!((20..40).all(|y| flat.get_pixel(17, y) == &Rgb([255, 255, 255])));
        assert!((20..40).any(|y| live.get_pixel(17, y) != &Rgb([255, 255, 255])));
    }

    #[test]
    fn band_finds_shapes_it_touches() {
        let mut document = white_document();
        let inside = document.add_shape(factory::rectangle(
            Rect::from_min_max(pos2(10.0, 10.0), pos2(20.0, 20.0)),
            Pen::default(),
            Fill::none(),
        ));
        document.add_shape(factory::rectangle(
            Rect::from_min_max(pos2(60.0, 60.0), pos2(70.0, 70.0)),
            Pen::default(),
            Fill::none(),
        ));
        let band = Rect::from_min_max(pos2(0.0, 0.0), pos2(15.0, 15.0));
        assert_eq!(document.shapes_intersecting(band), vec![inside]);
        assert!(document.shapes_intersecting(Rect::from_min_max(pos2(40.0, 0.0), pos2(50.0, 5.0))).is_empty());
    }

    #[test]
    fn higher_z_is_found_first() {
        let mut document = white_document();
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(50.0, 50.0));
        let mut top = factory::rectangle(rect, Pen::default(), Fill::none());
        top.set_z(5.0);
        let top_id = document.add_shape(top);
        let bottom_id = document.add_shape(factory::rectangle(rect, Pen::default(), Fill::none()));
        assert_eq!(document.top_shape_at(pos2(25.0, 25.0)), Some(top_id));
        document.remove_shape(top_id);
        assert_eq!(document.top_shape_at(pos2(25.0, 25.0)), Some(bottom_id));
        assert_eq!(document.top_shape_at(pos2(90.0, 70.0)), None);
    }

    #[test]
    fn crop_region_is_clamped() {
        let document = white_document();
        let region = document
            .clamp_region(Rect::from_min_max(pos2(-20.0, 10.0), pos2(30.0, 200.0)))
            .expect("overlaps");
        assert_eq!(
            region,
            PixelRegion {
                x: 0,
                y: 10,
                width: 30,
                height: 70
            }
        );
        let outside = Rect::from_min_max(pos2(200.0, 200.0), pos2(300.0, 300.0));
        assert!(matches!(
            document.clamp_region(outside),
            Err(EditorError::EmptyCrop { .. })
        ));
    }

    #[test]
    fn sampling_outside_fails() {
        let document = white_document();
        assert_eq!(document.sample(pos2(5.5, 5.5)), Ok(Color32::WHITE));
        assert!(document.sample(pos2(-1.0, 5.0)).is_err());
        assert!(document.sample(pos2(100.0, 5.0)).is_err());
    }

    #[test]
    fn brush_commit_clears_pending() {
        let mut document = white_document();
        document.push_brush_segment(BrushSegment {
            from: pos2(10.0, 10.0),
            to: pos2(20.0, 10.0),
            pen: Pen::new(Color32::BLACK, 3.0),
        });
        assert_eq!(document.flatten_to_image().get_pixel(15, 10), &Rgb([255, 255, 255]));
        assert_eq!(document.commit_brush_stroke(), 1);
        assert!(document.pending_segments().is_empty());
        assert_eq!(document.raster().get_pixel(15, 10), &Rgb([0, 0, 0]));
    }
}
