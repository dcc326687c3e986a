use egui::{Pos2, Rect, pos2, vec2};

use crate::document::Preview;
use crate::element::{ShapeItem, factory};
use crate::error::{EditorError, EditorResult};
use crate::style::{Fill, Pen, ToolStyle};

/// Which two-point shape a press-drag-release gesture builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTool {
    Ellipse,
    Rectangle,
    Line,
}

impl ShapeTool {
    fn name(self) -> &'static str {
        match self {
            ShapeTool::Ellipse => "ellipse",
            ShapeTool::Rectangle => "rectangle",
            ShapeTool::Line => "line",
        }
    }
}

/// Ellipse geometry for a drag from `anchor` to `pointer`.
///
/// Unlocked, the ellipse is centered on the anchor and spans twice the pointer offset.
/// Locked, it is a circle centered on the anchor passing through the pointer.
pub fn ellipse_rect(anchor: Pos2, pointer: Pos2, locked: bool) -> Rect {
    let delta = pointer - anchor;
    let half = if locked {
        let radius = delta.length();
        vec2(radius, radius)
    } else {
        vec2(delta.x.abs(), delta.y.abs())
    };
    Rect::from_min_max(anchor - half, anchor + half)
}

/// Rectangle geometry for a drag from `anchor` to `pointer`.
///
/// Locked, a square of side `min(|dx|, |dy|)` grows from the anchor toward the pointer.
pub fn rectangle_rect(anchor: Pos2, pointer: Pos2, locked: bool) -> Rect {
    if !locked {
        return Rect::from_two_pos(anchor, pointer);
    }
    let delta = pointer - anchor;
    let side = delta.x.abs().min(delta.y.abs());
    let corner = pos2(
        anchor.x + side.copysign(delta.x),
        anchor.y + side.copysign(delta.y),
    );
    Rect::from_two_pos(anchor, corner)
}

/// An ellipse, rectangle or line being dragged out.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDraft {
    pub tool: ShapeTool,
    pub anchor: Pos2,
    pub current: Pos2,
}

impl ShapeDraft {
    pub fn new(tool: ShapeTool, anchor: Pos2) -> Self {
        Self {
            tool,
            anchor,
            current: anchor,
        }
    }

    pub fn preview(&self, locked: bool) -> Preview {
        match self.tool {
            ShapeTool::Ellipse => Preview::Ellipse(ellipse_rect(self.anchor, self.current, locked)),
            ShapeTool::Rectangle => {
                Preview::Rectangle(rectangle_rect(self.anchor, self.current, locked))
            }
            ShapeTool::Line => Preview::Line(self.anchor, self.current),
        }
    }

    /// Builds the persistent shape ending at `end` with the current style.
    pub fn build(&self, end: Pos2, locked: bool, style: &ToolStyle) -> EditorResult<ShapeItem> {
        let pen = style.shape_pen();
        let degenerate = EditorError::DegenerateShape(self.tool.name());
        match self.tool {
            ShapeTool::Ellipse | ShapeTool::Rectangle => {
                let rect = if self.tool == ShapeTool::Ellipse {
                    ellipse_rect(self.anchor, end, locked)
                } else {
                    rectangle_rect(self.anchor, end, locked)
                };
                if rect.width() == 0.0 && rect.height() == 0.0 {
                    return Err(degenerate);
                }
                let fill = style.shape_fill();
                Ok(if self.tool == ShapeTool::Ellipse {
                    factory::ellipse(rect, pen, fill)
                } else {
                    factory::rectangle(rect, pen, fill)
                })
            }
            ShapeTool::Line => {
                if end == self.anchor {
                    return Err(degenerate);
                }
                Ok(factory::line(self.anchor, end, pen))
            }
        }
    }
}

/// Freehand path accumulated while the button is held.
#[derive(Debug, Clone, PartialEq)]
pub struct PathDraft {
    points: Vec<Pos2>,
}

impl PathDraft {
    pub fn new(anchor: Pos2) -> Self {
        Self {
            points: vec![anchor],
        }
    }

    pub fn push(&mut self, point: Pos2) {
        self.points.push(point);
    }

    /// Whether the pointer moved at least once
    pub fn has_moved(&self) -> bool {
        self.points.len() > 1
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn preview(&self) -> Preview {
        Preview::Path(self.points.clone())
    }

    pub fn build(&self, pen: Pen) -> EditorResult<ShapeItem> {
        if !self.has_moved() {
            return Err(EditorError::EmptyPath);
        }
        factory::path(&self.points, pen).ok_or(EditorError::EmptyPath)
    }
}

/// Polygon vertices collected one click at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonDraft {
    points: Vec<Pos2>,
}

impl PolygonDraft {
    /// Adds a vertex; a click on the previous vertex is ignored.
    pub fn add_point(&mut self, point: Pos2) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn preview(&self) -> Preview {
        Preview::Polygon(self.points.clone())
    }

    /// Consumes the collected vertices. Fewer than three is an error, and the vertices
    /// are discarded either way.
    pub fn finish(&mut self, pen: Pen, fill: Fill) -> EditorResult<ShapeItem> {
        let points = std::mem::take(&mut self.points);
        factory::polygon(&points, pen, fill).ok_or(EditorError::NotEnoughPoints(points.len()))
    }
}
