use egui::{Pos2, Rect, Vec2, pos2, vec2};
use image::RgbImage;

use super::{CoverageMask, Raster, edge_coverage};
use crate::geometry::bounds_of;
use crate::style::{CapStyle, Fill, FillStyle, JoinStyle, Pen};

/// Miter joins longer than this multiple of the half width fall back to bevel joins.
const MITER_LIMIT: f32 = 2.0;

/// Sub-scanlines per pixel row when filling polygons.
const FILL_SUBSAMPLES: usize = 4;

/// Strokes a polyline into `raster` with `pen`.
pub fn stroke_polyline(raster: &mut Raster, points: &[Pos2], closed: bool, pen: &Pen) {
    if !pen.is_visible() {
        return;
    }
    let points = dedup_points(points);
    let Some(bounds) = bounds_of(&points) else {
        return;
    };
    let margin = pen.effective_width() * MITER_LIMIT + 2.0;
    let Some(mut mask) = CoverageMask::covering(raster.width(), raster.height(), bounds.expand(margin))
    else {
        return;
    };
    let half_width = pen.effective_width() / 2.0;
    match pen.style.dash_pattern() {
        None => stroke_solid(&mut mask, &points, closed, half_width, pen.cap, pen.join),
        Some(pattern) => {
            for dash in dash_polyline(&points, closed, pattern, pen.effective_width()) {
                stroke_solid(&mut mask, &dash, false, half_width, pen.cap, pen.join);
            }
        }
    }
    mask.composite(raster, pen.color, FillStyle::Solid);
}

/// Fills a polygon (even-odd rule) into `raster` with `fill`.
pub fn fill_polygon(raster: &mut Raster, polygon: &[Pos2], fill: &Fill) {
    if fill.is_none() || polygon.len() < 3 {
        return;
    }
    let Some(bounds) = bounds_of(polygon) else {
        return;
    };
    let Some(mut mask) = CoverageMask::covering(raster.width(), raster.height(), bounds) else {
        return;
    };
    fill_mask(&mut mask, polygon);
    mask.composite(raster, fill.color, fill.style);
}

/// Copies `image` into `raster` with its top-left corner at `top_left`, rounded to whole
/// pixels and clipped to the raster.
pub fn blit_image(raster: &mut Raster, image: &RgbImage, top_left: Pos2) {
    let ox = top_left.x.round() as i64;
    let oy = top_left.y.round() as i64;
    for (x, y, pixel) in image.enumerate_pixels() {
        let (tx, ty) = (ox + x as i64, oy + y as i64);
        if tx >= 0 && ty >= 0 && tx < raster.width() as i64 && ty < raster.height() as i64 {
            raster.put_pixel(tx as u32, ty as u32, *pixel);
        }
    }
}

/// Corners of `rect`, clockwise from the top-left.
pub fn rect_points(rect: Rect) -> Vec<Pos2> {
    vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
}

/// Polygon approximating the ellipse inscribed in `rect`.
pub fn ellipse_points(rect: Rect) -> Vec<Pos2> {
    let center = rect.center();
    let (rx, ry) = (rect.width() / 2.0, rect.height() / 2.0);
    let circumference = std::f32::consts::TAU * rx.max(ry);
    let steps = (circumference / 2.0).ceil().clamp(16.0, 720.0) as usize;
    (0..steps)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / steps as f32;
            pos2(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}

/// Splits a polyline into the "on" pieces of a dash pattern given in units of `width`.
pub fn dash_polyline(points: &[Pos2], closed: bool, pattern: &[f32], width: f32) -> Vec<Vec<Pos2>> {
    let mut dashes = Vec::new();
    if points.len() < 2 || pattern.is_empty() {
        return dashes;
    }
    let lengths: Vec<f32> = pattern.iter().map(|p| (p * width).max(0.5)).collect();
    let mut phase = 0;
    let mut remaining = lengths[0];
    let mut current = vec![points[0]];

    let closing = closed.then(|| [points[points.len() - 1], points[0]]);
    let segments = points
        .windows(2)
        .map(|w| (w[0], w[1]))
        .chain(closing.map(|c| (c[0], c[1])));

    for (a, b) in segments {
        let mut start = a;
        let mut left = (b - a).length();
        while left > 0.0 {
            let step = left.min(remaining);
            let dir = (b - start).normalized();
            let end = start + dir * step;
            if phase % 2 == 0 {
                current.push(end);
            }
            left -= step;
            remaining -= step;
            start = end;
            if remaining <= 0.0 {
                if phase % 2 == 0 && current.len() > 1 {
                    dashes.push(std::mem::take(&mut current));
                }
                phase = (phase + 1) % lengths.len();
                remaining = lengths[phase];
                current = vec![start];
            }
        }
    }
    if phase % 2 == 0 && current.len() > 1 {
        dashes.push(current);
    }
    dashes
}

fn dedup_points(points: &[Pos2]) -> Vec<Pos2> {
    let mut out: Vec<Pos2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last() != Some(p) {
            out.push(*p);
        }
    }
    out
}

fn stroke_solid(
    mask: &mut CoverageMask,
    points: &[Pos2],
    closed: bool,
    half_width: f32,
    cap: CapStyle,
    join: JoinStyle,
) {
    match points {
        [] => {}
        [single] => stamp_dot(mask, *single, half_width, cap),
        _ => {
            let closed = closed && points.len() > 2;
            let count = points.len();
            let segment_count = if closed { count } else { count - 1 };
            for i in 0..segment_count {
                let a = points[i];
                let b = points[(i + 1) % count];
                let start_cap = if !closed && i == 0 { cap } else { CapStyle::Flat };
                let end_cap = if !closed && i + 1 == segment_count {
                    cap
                } else {
                    CapStyle::Flat
                };
                stamp_segment(mask, a, b, half_width, start_cap, end_cap);
            }
            let vertices = if closed { 0..count } else { 1..count - 1 };
            for i in vertices {
                let prev = points[(i + count - 1) % count];
                let next = points[(i + 1) % count];
                stamp_join(mask, prev, points[i], next, half_width, join);
            }
        }
    }
}

fn stamp_dot(mask: &mut CoverageMask, center: Pos2, half_width: f32, cap: CapStyle) {
    match cap {
        CapStyle::Flat => {}
        CapStyle::Round => stamp_disc(mask, center, half_width),
        CapStyle::Square => {
            let rect = Rect::from_center_size(center, Vec2::splat(half_width * 2.0));
            mask.shade(rect.expand(1.0), |x, y| {
                edge_coverage(half_width, (x - center.x).abs().max((y - center.y).abs()))
            });
        }
    }
}

fn stamp_disc(mask: &mut CoverageMask, center: Pos2, radius: f32) {
    let rect = Rect::from_center_size(center, Vec2::splat(radius * 2.0)).expand(1.0);
    mask.shade(rect, |x, y| edge_coverage(radius, pos2(x, y).distance(center)));
}

fn stamp_segment(
    mask: &mut CoverageMask,
    a: Pos2,
    b: Pos2,
    half_width: f32,
    start_cap: CapStyle,
    end_cap: CapStyle,
) {
    let length = (b - a).length();
    if length == 0.0 {
        stamp_dot(mask, a, half_width, start_cap);
        return;
    }
    let dir = (b - a) / length;
    let normal = vec2(-dir.y, dir.x);
    let lo = if start_cap == CapStyle::Square { -half_width } else { 0.0 };
    let hi = length + if end_cap == CapStyle::Square { half_width } else { 0.0 };

    let rect = Rect::from_two_pos(a, b).expand(half_width + 1.0);
    mask.shade(rect, |x, y| {
        let v = pos2(x, y) - a;
        let along = v.dot(dir);
        let across = v.dot(normal).abs();
        let body = edge_coverage(half_width, across);
        let ends = ((along - lo).min(hi - along) + 0.5).clamp(0.0, 1.0);
        body * ends
    });

    if start_cap == CapStyle::Round {
        stamp_disc(mask, a, half_width);
    }
    if end_cap == CapStyle::Round {
        stamp_disc(mask, b, half_width);
    }
}

fn stamp_join(
    mask: &mut CoverageMask,
    prev: Pos2,
    vertex: Pos2,
    next: Pos2,
    half_width: f32,
    join: JoinStyle,
) {
    let d1 = (vertex - prev).normalized();
    let d2 = (next - vertex).normalized();
    let n1 = vec2(-d1.y, d1.x);
    let n2 = vec2(-d2.y, d2.x);
    let turn = d2.dot(n1);
    if join == JoinStyle::Round {
        stamp_disc(mask, vertex, half_width);
        return;
    }
    if turn.abs() < 1e-6 {
        return;
    }
    // Outer side of the turn
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let p1 = vertex + n1 * half_width * side;
    let p2 = vertex + n2 * half_width * side;

    let cos_half = ((1.0 + n1.dot(n2)) / 2.0).max(0.0).sqrt();
    let miter_fits = cos_half > 0.0 && 1.0 / cos_half <= MITER_LIMIT;
    if join == JoinStyle::Miter && miter_fits {
        let tip = vertex + (n1 + n2).normalized() * side * (half_width / cos_half);
        fill_mask(mask, &[vertex, p1, tip, p2]);
    } else {
        fill_mask(mask, &[vertex, p1, p2]);
    }
}

/// Even-odd scanline fill with `FILL_SUBSAMPLES` rows per pixel and exact horizontal coverage.
pub(crate) fn fill_mask(mask: &mut CoverageMask, polygon: &[Pos2]) {
    if polygon.len() < 3 {
        return;
    }
    let Some(bounds) = bounds_of(polygon) else {
        return;
    };
    let weight = 1.0 / FILL_SUBSAMPLES as f32;
    let first = (bounds.min.y - 0.5).floor() as i64;
    let last = (bounds.max.y + 0.5).ceil() as i64;
    let rows = mask.row_range();
    let mut row = mask.row_buffer();
    let mut crossings = Vec::new();

    for y in first.max(*rows.start())..=last.min(*rows.end()) {
        row.fill(0.0);
        for k in 0..FILL_SUBSAMPLES {
            let sy = y as f32 - 0.5 + (k as f32 + 0.5) * weight;
            crossings.clear();
            let mut j = polygon.len() - 1;
            for i in 0..polygon.len() {
                let (a, b) = (polygon[j], polygon[i]);
                if (a.y > sy) != (b.y > sy) {
                    crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
                j = i;
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                mask.add_span(&mut row, pair[0], pair[1], weight);
            }
        }
        mask.merge_row(y, &row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;
    use image::Rgb;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn white(size: u32) -> Raster {
        Raster::from_pixel(size, size, WHITE)
    }

    #[test]
    fn round_capped_segment_covers_half_width() {
        let mut raster = white(64);
        let pen = Pen::new(Color32::BLACK, 5.0);
        stroke_polyline(&mut raster, &[pos2(10.0, 10.0), pos2(10.0, 50.0)], false, &pen);
        for y in 10..=50 {
            for x in 8..=12 {
                assert_eq!(raster.get_pixel(x, y), &BLACK, "({x}, {y})");
            }
            assert_eq!(raster.get_pixel(7, y), &WHITE);
            assert_eq!(raster.get_pixel(13, y), &WHITE);
        }
        assert_eq!(raster.get_pixel(10, 55), &WHITE);
    }

    #[test]
    fn flat_cap_stops_at_endpoint() {
        let mut raster = white(32);
        let pen = Pen::new(Color32::BLACK, 3.0).with_style(
            crate::style::PenStyle::Solid,
            CapStyle::Flat,
            JoinStyle::Miter,
        );
        stroke_polyline(&mut raster, &[pos2(5.0, 10.0), pos2(20.0, 10.0)], false, &pen);
        assert_eq!(raster.get_pixel(12, 10), &BLACK);
        assert_eq!(raster.get_pixel(3, 10), &WHITE);
        assert_eq!(raster.get_pixel(22, 10), &WHITE);
    }

    #[test]
    fn polygon_fill_is_exact_on_pixel_grid() {
        let mut raster = white(20);
        let square = rect_points(Rect::from_min_max(pos2(4.5, 4.5), pos2(9.5, 9.5)));
        fill_polygon(&mut raster, &square, &Fill::solid(Color32::BLACK));
        assert_eq!(raster.get_pixel(5, 5), &BLACK);
        assert_eq!(raster.get_pixel(9, 9), &BLACK);
        assert_eq!(raster.get_pixel(4, 5), &WHITE);
        assert_eq!(raster.get_pixel(10, 9), &WHITE);
    }

    #[test]
    fn hatch_fill_leaves_gaps() {
        let mut raster = white(32);
        let square = rect_points(Rect::from_min_max(pos2(0.0, 0.0), pos2(31.0, 31.0)));
        let fill = Fill {
            style: FillStyle::Horizontal,
            color: Color32::BLACK,
        };
        fill_polygon(&mut raster, &square, &fill);
        assert_eq!(raster.get_pixel(10, 8), &BLACK);
        assert_eq!(raster.get_pixel(10, 9), &WHITE);
    }

    #[test]
    fn dashes_alternate() {
        let dashes = dash_polyline(&[pos2(0.0, 0.0), pos2(60.0, 0.0)], false, &[4.0, 2.0], 2.0);
        assert_eq!(dashes.len(), 5);
        assert_eq!(dashes[0], vec![pos2(0.0, 0.0), pos2(8.0, 0.0)]);
        assert_eq!(dashes[1][0], pos2(12.0, 0.0));
    }

    #[test]
    fn ellipse_points_lie_on_ellipse() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(40.0, 20.0));
        for p in ellipse_points(rect) {
            let nx = (p.x - 20.0) / 20.0;
            let ny = (p.y - 10.0) / 10.0;
            assert!((nx * nx + ny * ny - 1.0).abs() < 1e-3);
        }
    }
}
