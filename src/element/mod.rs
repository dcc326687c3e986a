use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod common;
mod drag;
mod image;
mod outline;
mod text;

pub use common::{HIT_TOLERANCE, OVERLAY_Z};
pub use drag::{
    DragState, Draggable, begin_drag, cancel_drag, cursor_hint, disable_dragging, drag_to,
    enable_dragging, finish_drag, set_selected,
};
pub use image::EmbeddedImage;
pub use outline::{EllipseShape, LineShape, PathShape, PolygonShape, RectangleShape};
pub use text::TextShape;

use crate::raster::Raster;
use crate::style::{Fill, FontSpec, Pen};

/// Stable identity of a shape, kept across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Common trait that all shape geometries implement
pub trait Element {
    /// Short lowercase name for logs
    fn kind_name(&self) -> &'static str;

    /// Bounds relative to the item's anchor, outline included
    fn local_bounds(&self) -> Rect;

    /// Hit test with `point` relative to the item's anchor
    fn contains_local(&self, point: Pos2) -> bool;

    /// Rasterize the geometry with its anchor at `anchor` in image space
    fn paint(&self, raster: &mut Raster, anchor: Pos2);
}

/// Geometry and style of a shape item
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Text(TextShape),
    Ellipse(EllipseShape),
    Rectangle(RectangleShape),
    Line(LineShape),
    Path(PathShape),
    Polygon(PolygonShape),
    Image(EmbeddedImage),
}

impl Element for ShapeKind {
    fn kind_name(&self) -> &'static str {
        match self {
            ShapeKind::Text(s) => s.kind_name(),
            ShapeKind::Ellipse(s) => s.kind_name(),
            ShapeKind::Rectangle(s) => s.kind_name(),
            ShapeKind::Line(s) => s.kind_name(),
            ShapeKind::Path(s) => s.kind_name(),
            ShapeKind::Polygon(s) => s.kind_name(),
            ShapeKind::Image(s) => s.kind_name(),
        }
    }

    fn local_bounds(&self) -> Rect {
        match self {
            ShapeKind::Text(s) => s.local_bounds(),
            ShapeKind::Ellipse(s) => s.local_bounds(),
            ShapeKind::Rectangle(s) => s.local_bounds(),
            ShapeKind::Line(s) => s.local_bounds(),
            ShapeKind::Path(s) => s.local_bounds(),
            ShapeKind::Polygon(s) => s.local_bounds(),
            ShapeKind::Image(s) => s.local_bounds(),
        }
    }

    fn contains_local(&self, point: Pos2) -> bool {
        match self {
            ShapeKind::Text(s) => s.contains_local(point),
            ShapeKind::Ellipse(s) => s.contains_local(point),
            ShapeKind::Rectangle(s) => s.contains_local(point),
            ShapeKind::Line(s) => s.contains_local(point),
            ShapeKind::Path(s) => s.contains_local(point),
            ShapeKind::Polygon(s) => s.contains_local(point),
            ShapeKind::Image(s) => s.contains_local(point),
        }
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        match self {
            ShapeKind::Text(s) => s.paint(raster, anchor),
            ShapeKind::Ellipse(s) => s.paint(raster, anchor),
            ShapeKind::Rectangle(s) => s.paint(raster, anchor),
            ShapeKind::Line(s) => s.paint(raster, anchor),
            ShapeKind::Path(s) => s.paint(raster, anchor),
            ShapeKind::Polygon(s) => s.paint(raster, anchor),
            ShapeKind::Image(s) => s.paint(raster, anchor),
        }
    }
}

/// A vector item floating over the raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeItem {
    id: ShapeId,
    /// Top-left anchor in image space
    position: Pos2,
    z: f32,
    drag: DragState,
    kind: ShapeKind,
}

impl ShapeItem {
    pub fn new(position: Pos2, kind: ShapeKind) -> Self {
        Self::with_id(ShapeId::new(), position, kind)
    }

    pub fn with_id(id: ShapeId, position: Pos2, kind: ShapeKind) -> Self {
        let z = match kind {
            ShapeKind::Text(_) | ShapeKind::Image(_) => OVERLAY_Z,
            _ => 0.0,
        };
        Self {
            id,
            position,
            z,
            drag: DragState::default(),
            kind,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    pub fn set_z(&mut self, z: f32) {
        self.z = z;
    }

    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ShapeKind {
        &mut self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.kind_name()
    }

    /// Bounds in image space
    pub fn bounding_box(&self) -> Rect {
        self.kind.local_bounds().translate(self.position.to_vec2())
    }

    /// Whether the image-space `point` lies on the item
    pub fn hit_test(&self, point: Pos2) -> bool {
        self.kind.contains_local(point - self.position.to_vec2())
    }

    pub fn paint(&self, raster: &mut Raster) {
        self.kind.paint(raster, self.position);
    }

    /// Outline pen, for the shapes that have one
    pub fn pen(&self) -> Option<Pen> {
        match &self.kind {
            ShapeKind::Ellipse(s) => Some(s.pen),
            ShapeKind::Rectangle(s) => Some(s.pen),
            ShapeKind::Line(s) => Some(s.pen),
            ShapeKind::Path(s) => Some(s.pen),
            ShapeKind::Polygon(s) => Some(s.pen),
            ShapeKind::Text(_) | ShapeKind::Image(_) => None,
        }
    }

    /// Returns `false` when the shape has no outline.
    pub fn set_pen(&mut self, pen: Pen) -> bool {
        match &mut self.kind {
            ShapeKind::Ellipse(s) => s.pen = pen,
            ShapeKind::Rectangle(s) => s.pen = pen,
            ShapeKind::Line(s) => s.pen = pen,
            ShapeKind::Path(s) => s.pen = pen,
            ShapeKind::Polygon(s) => s.pen = pen,
            ShapeKind::Text(_) | ShapeKind::Image(_) => return false,
        }
        true
    }

    /// Interior fill, for closed shapes
    pub fn fill(&self) -> Option<Fill> {
        match &self.kind {
            ShapeKind::Ellipse(s) => Some(s.fill),
            ShapeKind::Rectangle(s) => Some(s.fill),
            ShapeKind::Polygon(s) => Some(s.fill),
            _ => None,
        }
    }

    /// Returns `false` when the shape is not closed.
    pub fn set_fill(&mut self, fill: Fill) -> bool {
        match &mut self.kind {
            ShapeKind::Ellipse(s) => s.fill = fill,
            ShapeKind::Rectangle(s) => s.fill = fill,
            ShapeKind::Polygon(s) => s.fill = fill,
            _ => return false,
        }
        true
    }

    pub fn is_selected(&self) -> bool {
        self.drag.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        set_selected(self, selected);
    }

    pub fn is_draggable(&self) -> bool {
        self.drag.movable
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        if draggable {
            enable_dragging(self);
        } else {
            disable_dragging(self);
        }
    }
}

impl Draggable for ShapeItem {
    fn drag_state(&self) -> &DragState {
        &self.drag
    }

    fn drag_state_mut(&mut self) -> &mut DragState {
        &mut self.drag
    }

    fn anchor(&self) -> Pos2 {
        self.position
    }

    fn set_anchor(&mut self, anchor: Pos2) {
        self.position = anchor;
    }
}

/// Factory functions for creating shape items in image space
pub mod factory {
    use super::*;
    use crate::geometry::bounds_of;

    pub fn text(text: impl Into<String>, font: FontSpec, color: Color32, position: Pos2) -> ShapeItem {
        ShapeItem::new(position, ShapeKind::Text(TextShape::new(text, font, color)))
    }

    /// Ellipse inscribed in `rect`
    pub fn ellipse(rect: Rect, pen: Pen, fill: Fill) -> ShapeItem {
        ShapeItem::new(
            rect.min,
            ShapeKind::Ellipse(EllipseShape {
                size: rect.size(),
                pen,
                fill,
            }),
        )
    }

    pub fn rectangle(rect: Rect, pen: Pen, fill: Fill) -> ShapeItem {
        ShapeItem::new(
            rect.min,
            ShapeKind::Rectangle(RectangleShape {
                size: rect.size(),
                pen,
                fill,
            }),
        )
    }

    /// Line anchored at `start`
    pub fn line(start: Pos2, end: Pos2, pen: Pen) -> ShapeItem {
        ShapeItem::new(start, ShapeKind::Line(LineShape { delta: end - start, pen }))
    }

    /// Path re-anchored to the top-left of its bounding box. `None` without points.
    pub fn path(points: &[Pos2], pen: Pen) -> Option<ShapeItem> {
        let origin = bounds_of(points)?.min;
        let points = points.iter().map(|p| *p - origin.to_vec2()).collect();
        Some(ShapeItem::new(origin, ShapeKind::Path(PathShape { points, pen })))
    }

    /// Polygon re-anchored to the top-left of its bounding box. `None` below 3 points.
    pub fn polygon(points: &[Pos2], pen: Pen, fill: Fill) -> Option<ShapeItem> {
        if points.len() < 3 {
            return None;
        }
        let origin = bounds_of(points)?.min;
        let points = points.iter().map(|p| *p - origin.to_vec2()).collect();
        Some(ShapeItem::new(
            origin,
            ShapeKind::Polygon(PolygonShape { points, pen, fill }),
        ))
    }

    pub fn image(pixels: Arc<Raster>, position: Pos2) -> ShapeItem {
        ShapeItem::new(position, ShapeKind::Image(EmbeddedImage::new(pixels)))
    }
}
