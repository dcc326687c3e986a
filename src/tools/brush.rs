use egui::{PointerButton, Pos2, pos2};

use crate::document::BrushSegment;
use crate::style::Pen;

/// Shift+drag constraint of a brush stroke to one axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AxisLock {
    #[default]
    Off,
    /// Waiting for the first movement to pick the axis
    Pending { origin: Pos2 },
    Horizontal { y: f32 },
    Vertical { x: f32 },
}

impl AxisLock {
    pub fn pending(origin: Pos2) -> Self {
        AxisLock::Pending { origin }
    }

    /// Projects `point` onto the locked axis, deciding the axis on the first real move:
    /// the larger of `|dx|` and `|dy|` wins, ties go vertical.
    pub fn constrain(&mut self, point: Pos2) -> Pos2 {
        if let AxisLock::Pending { origin } = *self {
            let delta = point - origin;
            if delta.x == 0.0 && delta.y == 0.0 {
                return origin;
            }
            *self = if delta.x.abs() > delta.y.abs() {
                AxisLock::Horizontal { y: origin.y }
            } else {
                AxisLock::Vertical { x: origin.x }
            };
        }
        match *self {
            AxisLock::Horizontal { y } => pos2(point.x, y),
            AxisLock::Vertical { x } => pos2(x, point.y),
            AxisLock::Off | AxisLock::Pending { .. } => point,
        }
    }
}

/// A brush stroke in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushStroke {
    pub button: PointerButton,
    pub last_point: Pos2,
    pub pen: Pen,
    pub lock: AxisLock,
}

impl BrushStroke {
    pub fn new(button: PointerButton, start: Pos2, pen: Pen, lock: AxisLock) -> Self {
        Self {
            button,
            last_point: start,
            pen,
            lock,
        }
    }

    /// Segment from the last point to `point` (after the axis lock). `None` when the
    /// pointer did not move.
    pub fn extend_to(&mut self, point: Pos2) -> Option<BrushSegment> {
        let point = self.lock.constrain(point);
        if point == self.last_point {
            return None;
        }
        let segment = BrushSegment {
            from: self.last_point,
            to: point,
            pen: self.pen,
        };
        self.last_point = point;
        Some(segment)
    }
}
