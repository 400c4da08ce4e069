//! Snapping of candidate points to other shapes, with transient guide lines.
//!
//! Each axis snaps independently: the candidate X is compared against every
//! target X, the candidate Y against every target Y, and each is replaced
//! only when the nearest target lies within tolerance.

use crate::shapes::{EntityId, Shape};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snap distance in surface pixels; divide by the viewport scale for canvas units.
pub const SNAP_TOLERANCE_PX: f64 = 10.0;

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A line of constant Y.
    Horizontal,
    /// A line of constant X.
    Vertical,
}

/// A guide line at a fixed canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideLine {
    pub id: Uuid,
    pub axis: GuideAxis,
    /// X for vertical guides, Y for horizontal guides.
    pub position: f64,
    /// Temporary guides come from snapping and are cleared on pointer-up.
    pub is_temp: bool,
}

impl GuideLine {
    pub fn new(axis: GuideAxis, position: f64, is_temp: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            axis,
            position,
            is_temp,
        }
    }

    pub fn vertical(x: f64) -> Self {
        Self::new(GuideAxis::Vertical, x, true)
    }

    pub fn horizontal(y: f64) -> Self {
        Self::new(GuideAxis::Horizontal, y, true)
    }
}

/// A point that can be snapped to on a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    /// The snap point location.
    pub point: Point,
    /// Type of snap target.
    pub kind: SnapTargetKind,
}

/// Type of snap target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// Corner of the bounding box.
    Corner,
    /// Midpoint of a bounding-box edge.
    Midpoint,
    /// Center of the bounding box.
    Center,
}

/// Collect the nine snap targets of a bounding box.
pub fn snap_targets_from_bounds(bounds: Rect) -> [SnapTarget; 9] {
    let c = bounds.center();
    let corner = |x, y| SnapTarget { point: Point::new(x, y), kind: SnapTargetKind::Corner };
    let midpoint = |x, y| SnapTarget { point: Point::new(x, y), kind: SnapTargetKind::Midpoint };
    [
        corner(bounds.x0, bounds.y0),
        corner(bounds.x1, bounds.y0),
        corner(bounds.x1, bounds.y1),
        corner(bounds.x0, bounds.y1),
        midpoint(c.x, bounds.y0),
        midpoint(bounds.x1, c.y),
        midpoint(c.x, bounds.y1),
        midpoint(bounds.x0, c.y),
        SnapTarget { point: c, kind: SnapTargetKind::Center },
    ]
}

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
    /// One temporary guide per snapped axis.
    pub guides: Vec<GuideLine>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
            guides: Vec::new(),
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Per-axis snap coordinates gathered from the model.
#[derive(Debug, Clone, Default)]
pub struct SnapCandidates {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl SnapCandidates {
    /// Gather targets from every shape not listed in `exclude`.
    pub fn from_shapes<'a>(shapes: impl IntoIterator<Item = &'a Shape>, exclude: &[EntityId]) -> Self {
        let mut candidates = Self::default();
        for shape in shapes {
            if exclude.contains(&shape.id) {
                continue;
            }
            for target in snap_targets_from_bounds(shape.bounds()) {
                candidates.xs.push(target.point.x);
                candidates.ys.push(target.point.y);
            }
        }
        candidates
    }

    /// Add persistent guides as single-axis targets.
    pub fn with_guides<'a>(mut self, guides: impl IntoIterator<Item = &'a GuideLine>) -> Self {
        for guide in guides.into_iter().filter(|g| !g.is_temp) {
            match guide.axis {
                GuideAxis::Vertical => self.xs.push(guide.position),
                GuideAxis::Horizontal => self.ys.push(guide.position),
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty() && self.ys.is_empty()
    }

    /// Snap `candidate` with a tolerance in canvas units.
    pub fn snap(&self, candidate: Point, tolerance: f64) -> SnapResult {
        let mut result = SnapResult::none(candidate);
        if let Some(x) = nearest_within(&self.xs, candidate.x, tolerance) {
            result.point.x = x;
            result.snapped_x = true;
            result.guides.push(GuideLine::vertical(x));
        }
        if let Some(y) = nearest_within(&self.ys, candidate.y, tolerance) {
            result.point.y = y;
            result.snapped_y = true;
            result.guides.push(GuideLine::horizontal(y));
        }
        result
    }
}

/// Tolerance in canvas units for a pixel tolerance at the given scale.
pub fn canvas_tolerance(tolerance_px: f64, scale: f64) -> f64 {
    tolerance_px / scale
}

/// Snap `candidate` against every shape except `exclude`.
pub fn snap_to_shapes(
    candidate: Point,
    shapes: &[Shape],
    exclude: &[EntityId],
    tolerance: f64,
) -> SnapResult {
    SnapCandidates::from_shapes(shapes, exclude).snap(candidate, tolerance)
}

fn nearest_within(values: &[f64], target: f64, tolerance: f64) -> Option<f64> {
    values
        .iter()
        .copied()
        .map(|v| (v, (v - target).abs()))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Shape> {
        vec![Shape::rectangle(0.0, 0.0, 100.0, 100.0)]
    }

    #[test]
    fn test_snap_near_corner() {
        let shapes = square();
        let result = snap_to_shapes(Point::new(103.0, 104.0), &shapes, &[], canvas_tolerance(SNAP_TOLERANCE_PX, 1.0));
        assert_eq!(result.point, Point::new(100.0, 100.0));
        assert!(result.snapped_x && result.snapped_y);
        assert_eq!(result.guides.len(), 2);
        assert!(result.guides.iter().any(|g| g.axis == GuideAxis::Vertical && g.position == 100.0));
        assert!(result.guides.iter().any(|g| g.axis == GuideAxis::Horizontal && g.position == 100.0));
        assert!(result.guides.iter().all(|g| g.is_temp));
    }

    #[test]
    fn test_no_snap_when_far() {
        let shapes = square();
        let result = snap_to_shapes(Point::new(150.0, 150.0), &shapes, &[], canvas_tolerance(SNAP_TOLERANCE_PX, 1.0));
        assert_eq!(result.point, Point::new(150.0, 150.0));
        assert!(!result.is_snapped());
        assert!(result.guides.is_empty());
    }

    #[test]
    fn test_single_axis_snap() {
        let shapes = square();
        let result = snap_to_shapes(Point::new(47.0, 300.0), &shapes, &[], 10.0);
        assert_eq!(result.point, Point::new(50.0, 300.0));
        assert!(result.snapped_x);
        assert!(!result.snapped_y);
        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].axis, GuideAxis::Vertical);
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        let shapes = square();
        // 8 canvas units away: outside 10px at scale 2, inside at scale 1.
        let candidate = Point::new(108.0, 500.0);
        assert!(!snap_to_shapes(candidate, &shapes, &[], canvas_tolerance(10.0, 2.0)).snapped_x);
        assert!(snap_to_shapes(candidate, &shapes, &[], canvas_tolerance(10.0, 1.0)).snapped_x);
    }

    #[test]
    fn test_excluded_shape_is_ignored() {
        let shapes = square();
        let result = snap_to_shapes(Point::new(101.0, 101.0), &shapes, &[shapes[0].id], 10.0);
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_picks_nearest_target() {
        let shapes = vec![
            Shape::rectangle(0.0, 0.0, 10.0, 10.0),
            Shape::rectangle(14.0, 40.0, 10.0, 10.0),
        ];
        let result = snap_to_shapes(Point::new(13.0, 200.0), &shapes, &[], 10.0);
        assert_eq!(result.point.x, 14.0);
    }

    #[test]
    fn test_persistent_guides_are_targets() {
        let guides = [
            GuideLine::new(GuideAxis::Horizontal, 250.0, false),
            GuideLine::horizontal(400.0),
        ];
        let candidates = SnapCandidates::from_shapes(&[], &[]).with_guides(&guides);
        let result = candidates.snap(Point::new(0.0, 246.0), 10.0);
        assert_eq!(result.point.y, 250.0);
        assert!(!candidates.snap(Point::new(0.0, 398.0), 10.0).snapped_y);
    }

    #[test]
    fn test_targets_from_bounds() {
        let targets = snap_targets_from_bounds(Rect::new(0.0, 0.0, 100.0, 50.0));
        assert_eq!(targets.iter().filter(|t| t.kind == SnapTargetKind::Corner).count(), 4);
        assert_eq!(targets.iter().filter(|t| t.kind == SnapTargetKind::Midpoint).count(), 4);
        assert_eq!(targets[8].point, Point::new(50.0, 25.0));
    }
}
