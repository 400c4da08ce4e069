//! Tapered outlines for freehand ink strokes.
//!
//! Pressure is simulated from a sample's position along the stroke: it peaks
//! at the midpoint and falls off linearly toward both ends. The outline is a
//! single closed polygon made of a forward rail followed by a return rail.

use kurbo::{BezPath, Point, Vec2};

/// Default thinning applied to committed ink.
pub const DEFAULT_THINNING: f64 = 0.6;

/// Minimum number of samples that produce an outline.
pub const MIN_OUTLINE_POINTS: usize = 2;

/// Brush parameters for [`stroke_outline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineOptions {
    /// Full brush diameter at peak pressure.
    pub size: f64,
    /// How strongly low pressure narrows the stroke, in `[0, 1]`.
    pub thinning: f64,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            size: 4.0,
            thinning: DEFAULT_THINNING,
        }
    }
}

impl OutlineOptions {
    pub fn new(size: f64, thinning: f64) -> Self {
        Self { size, thinning }
    }

    /// Half-width of the ribbon at the given pressure.
    pub fn half_width(&self, pressure: f64) -> f64 {
        let thinning = self.thinning.clamp(0.0, 1.0);
        self.size * (1.0 - thinning * (1.0 - pressure)) / 2.0
    }
}

/// Simulated pressure for sample `index` of `count`: 1.0 at the middle, 0.0 at the ends.
pub fn simulated_pressure(index: usize, count: usize) -> f64 {
    if count < 2 {
        return 1.0;
    }
    let t = index as f64 / (count - 1) as f64;
    1.0 - (2.0 * t - 1.0).abs()
}

/// Compute the outline polygon for a sampled stroke.
///
/// Returns `2 * points.len()` boundary points, or an empty vector when fewer
/// than [`MIN_OUTLINE_POINTS`] samples are given.
pub fn stroke_outline(points: &[Point], options: &OutlineOptions) -> Vec<Point> {
    let count = points.len();
    if count < MIN_OUTLINE_POINTS {
        return Vec::new();
    }

    let mut outline = Vec::with_capacity(count * 2);
    let mut offsets = Vec::with_capacity(count);

    for (i, &point) in points.iter().enumerate() {
        let angle = local_angle(points, i);
        let half = options.half_width(simulated_pressure(i, count));
        let offset = Vec2::new(-angle.sin(), angle.cos()) * half;
        outline.push(point + offset);
        offsets.push(offset);
    }

    for (point, offset) in points.iter().zip(offsets).rev() {
        outline.push(*point - offset);
    }

    outline
}

/// Build a closed fillable path from an outline polygon.
pub fn outline_to_path(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = outline.split_first() else {
        return path;
    };
    path.move_to(*first);
    for &p in rest {
        path.line_to(p);
    }
    path.close_path();
    path
}

/// Direction of travel at sample `i`: toward it from the previous sample, or
/// along the first segment for the first sample.
fn local_angle(points: &[Point], i: usize) -> f64 {
    let d = if i == 0 {
        points[1] - points[0]
    } else {
        points[i] - points[i - 1]
    };
    if d.hypot2() < f64::EPSILON {
        0.0
    } else {
        d.y.atan2(d.x)
    }
}
