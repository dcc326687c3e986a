use egui::{Pos2, Rect, Vec2};

/// Distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let line = b - a;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(a + line * t)
}

/// Smallest distance from `point` to any segment of the polyline.
pub fn polyline_distance(point: Pos2, points: &[Pos2], closed: bool) -> f32 {
    match points {
        [] => f32::INFINITY,
        [single] => point.distance(*single),
        _ => {
            let open = points
                .windows(2)
                .map(|w| distance_to_segment(point, w[0], w[1]))
                .fold(f32::INFINITY, f32::min);
            if closed {
                let last = points[points.len() - 1];
                open.min(distance_to_segment(point, last, points[0]))
            } else {
                open
            }
        }
    }
}

/// Even-odd containment test.
pub fn point_in_polygon(point: Pos2, polygon: &[Pos2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Bounding rectangle of a set of points, `None` when empty.
pub fn bounds_of(points: &[Pos2]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_min_max(*first, *first);
    for p in &points[1..] {
        rect.extend_with(*p);
    }
    Some(rect)
}

pub fn translate_points(points: &mut [Pos2], delta: Vec2) {
    for p in points {
        *p += delta;
    }
}
