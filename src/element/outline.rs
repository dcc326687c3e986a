use egui::{Pos2, Rect, Vec2};

use super::Element;
use super::common::{hit_slack, outline_bounds, shifted};
use crate::geometry::{bounds_of, distance_to_segment, point_in_polygon, polyline_distance};
use crate::raster::{Raster, ellipse_points, fill_polygon, rect_points, stroke_polyline};
use crate::style::{Fill, Pen};

/// Axis-aligned ellipse inscribed in `(0, 0)..size` relative to the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub size: Vec2,
    pub pen: Pen,
    pub fill: Fill,
}

impl EllipseShape {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size)
    }
}

impl Element for EllipseShape {
    fn kind_name(&self) -> &'static str {
        "ellipse"
    }

    fn local_bounds(&self) -> Rect {
        outline_bounds(self.rect(), &self.pen)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        let rect = self.rect();
        let outline = ellipse_points(rect);
        point_in_polygon(point, &outline)
            || polyline_distance(point, &outline, true) <= hit_slack(&self.pen)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        let outline = ellipse_points(self.rect().translate(anchor.to_vec2()));
        fill_polygon(raster, &outline, &self.fill);
        stroke_polyline(raster, &outline, true, &self.pen);
    }
}

/// Rectangle spanning `(0, 0)..size` relative to the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct RectangleShape {
    pub size: Vec2,
    pub pen: Pen,
    pub fill: Fill,
}

impl RectangleShape {
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.size)
    }
}

impl Element for RectangleShape {
    fn kind_name(&self) -> &'static str {
        "rectangle"
    }

    fn local_bounds(&self) -> Rect {
        outline_bounds(self.rect(), &self.pen)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        self.rect().expand(hit_slack(&self.pen)).contains(point)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        let corners = rect_points(self.rect().translate(anchor.to_vec2()));
        fill_polygon(raster, &corners, &self.fill);
        stroke_polyline(raster, &corners, true, &self.pen);
    }
}

/// Straight line from the anchor to `anchor + delta`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    pub delta: Vec2,
    pub pen: Pen,
}

impl Element for LineShape {
    fn kind_name(&self) -> &'static str {
        "line"
    }

    fn local_bounds(&self) -> Rect {
        outline_bounds(Rect::from_two_pos(Pos2::ZERO, self.delta.to_pos2()), &self.pen)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        distance_to_segment(point, Pos2::ZERO, self.delta.to_pos2()) <= hit_slack(&self.pen)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        stroke_polyline(raster, &[anchor, anchor + self.delta], false, &self.pen);
    }
}

/// Freehand polyline, points relative to the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PathShape {
    pub points: Vec<Pos2>,
    pub pen: Pen,
}

impl Element for PathShape {
    fn kind_name(&self) -> &'static str {
        "path"
    }

    fn local_bounds(&self) -> Rect {
        bounds_of(&self.points)
            .map(|rect| outline_bounds(rect, &self.pen))
            .unwrap_or(Rect::NOTHING)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        polyline_distance(point, &self.points, false) <= hit_slack(&self.pen)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        stroke_polyline(raster, &shifted(&self.points, anchor), false, &self.pen);
    }
}

/// Closed polygon, points relative to the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub points: Vec<Pos2>,
    pub pen: Pen,
    pub fill: Fill,
}

impl Element for PolygonShape {
    fn kind_name(&self) -> &'static str {
        "polygon"
    }

    fn local_bounds(&self) -> Rect {
        bounds_of(&self.points)
            .map(|rect| outline_bounds(rect, &self.pen))
            .unwrap_or(Rect::NOTHING)
    }

    fn contains_local(&self, point: Pos2) -> bool {
        point_in_polygon(point, &self.points)
            || polyline_distance(point, &self.points, true) <= hit_slack(&self.pen)
    }

    fn paint(&self, raster: &mut Raster, anchor: Pos2) {
        let points = shifted(&self.points, anchor);
        fill_polygon(raster, &points, &self.fill);
        stroke_polyline(raster, &points, true, &self.pen);
    }
}
