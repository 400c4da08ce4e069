//! Geometry helpers shared by hit-testing, snapping and rendering.

use kurbo::{Affine, Point, Rect, Vec2};

/// Distance from `point` to the segment `a`-`b`.
///
/// The projection parameter is clamped to `[0, 1]`, so points beyond an
/// endpoint measure to that endpoint. A degenerate segment (`a == b`)
/// measures to `a`.
pub fn point_to_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    (point - proj).hypot()
}

/// Rotate `point` about `center` by `angle_degrees`.
///
/// Positive angles turn clockwise on a y-down surface.
pub fn rotate_point(point: Point, center: Point, angle_degrees: f64) -> Point {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// The affine rotation about `center` used for both shape primitives and
/// their selection decorations.
pub fn rotation_about(center: Point, angle_degrees: f64) -> Affine {
    if angle_degrees.abs() < f64::EPSILON {
        return Affine::IDENTITY;
    }
    Affine::rotate_about(angle_degrees.to_radians(), center)
}

/// Closed containment test (edges count as inside).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Iterate a flat `[x0, y0, x1, y1, ...]` coordinate buffer as points.
///
/// A trailing odd coordinate is ignored.
pub fn flat_points(coords: &[f64]) -> impl Iterator<Item = Point> + '_ {
    coords.chunks_exact(2).map(|c| Point::new(c[0], c[1]))
}

/// Axis-aligned bounds of a point set, or `None` if it is empty.
pub fn points_bounds(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(p)))
}
