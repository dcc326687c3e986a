use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::{
    EllipseShape, LineShape, RectangleShape, ShapeId, ShapeItem, ShapeKind, TextShape,
};
use crate::style::{Fill, FontSpec, Pen};

/// Serializable description of a shape kept in a history entry.
///
/// Only text, ellipses, rectangles and lines are recorded. Paths, polygons and embedded
/// images stay out of history and are left untouched when an entry is restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeRecord {
    Text {
        id: ShapeId,
        position: Pos2,
        z: f32,
        text: String,
        font: FontSpec,
        color: Color32,
    },
    Ellipse {
        id: ShapeId,
        position: Pos2,
        z: f32,
        width: f32,
        height: f32,
        pen: Pen,
        fill: Fill,
    },
    Rectangle {
        id: ShapeId,
        position: Pos2,
        z: f32,
        width: f32,
        height: f32,
        pen: Pen,
        fill: Fill,
    },
    Line {
        id: ShapeId,
        position: Pos2,
        z: f32,
        delta: Vec2,
        pen: Pen,
    },
}

impl ShapeRecord {
    /// `None` for shape kinds that history does not track.
    pub fn capture(item: &ShapeItem) -> Option<Self> {
        let (id, position, z) = (item.id(), item.position(), item.z());
        match item.kind() {
            ShapeKind::Text(s) => Some(Self::Text {
                id,
                position,
                z,
                text: s.text.clone(),
                font: s.font.clone(),
                color: s.color,
            }),
            ShapeKind::Ellipse(s) => Some(Self::Ellipse {
                id,
                position,
                z,
                width: s.size.x,
                height: s.size.y,
                pen: s.pen,
                fill: s.fill,
            }),
            ShapeKind::Rectangle(s) => Some(Self::Rectangle {
                id,
                position,
                z,
                width: s.size.x,
                height: s.size.y,
                pen: s.pen,
                fill: s.fill,
            }),
            ShapeKind::Line(s) => Some(Self::Line {
                id,
                position,
                z,
                delta: s.delta,
                pen: s.pen,
            }),
            ShapeKind::Path(_) | ShapeKind::Polygon(_) | ShapeKind::Image(_) => None,
        }
    }

    /// Whether items of this kind are captured by [`ShapeRecord::capture`].
    pub fn is_tracked(kind: &ShapeKind) -> bool {
        match kind {
            ShapeKind::Text(_)
            | ShapeKind::Ellipse(_)
            | ShapeKind::Rectangle(_)
            | ShapeKind::Line(_) => true,
            ShapeKind::Path(_) | ShapeKind::Polygon(_) | ShapeKind::Image(_) => false,
        }
    }

    pub fn id(&self) -> ShapeId {
        match self {
            Self::Text { id, .. }
            | Self::Ellipse { id, .. }
            | Self::Rectangle { id, .. }
            | Self::Line { id, .. } => *id,
        }
    }

    /// Recreates the shape with its original id, position and z-value.
    pub fn restore(&self) -> ShapeItem {
        let (id, position, z, kind) = match self {
            Self::Text {
                id,
                position,
                z,
                text,
                font,
                color,
            } => (
                *id,
                *position,
                *z,
                ShapeKind::Text(TextShape::new(text.clone(), font.clone(), *color)),
            ),
            Self::Ellipse {
                id,
                position,
                z,
                width,
                height,
                pen,
                fill,
            } => (
                *id,
                *position,
                *z,
                ShapeKind::Ellipse(EllipseShape {
                    size: Vec2::new(*width, *height),
                    pen: *pen,
                    fill: *fill,
                }),
            ),
            Self::Rectangle {
                id,
                position,
                z,
                width,
                height,
                pen,
                fill,
            } => (
                *id,
                *position,
                *z,
                ShapeKind::Rectangle(RectangleShape {
                    size: Vec2::new(*width, *height),
                    pen: *pen,
                    fill: *fill,
                }),
            ),
            Self::Line {
                id,
                position,
                z,
                delta,
                pen,
            } => (*id, *position, *z, ShapeKind::Line(LineShape { delta: *delta, pen: *pen })),
        };
        let mut item = ShapeItem::with_id(id, position, kind);
        item.set_z(z);
        item
    }
}
