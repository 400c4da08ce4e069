//! Freehand ink paths.

use crate::geometry::{flat_points, point_to_segment_distance, points_bounds};
use crate::shapes::{EntityId, SerializableColor, default_stroke_width};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum number of samples for a path to be kept.
pub const MIN_PATH_POINTS: usize = 2;

/// A committed freehand stroke.
///
/// Points are stored flat as `[x0, y0, x1, y1, ...]` in canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InkPath {
    pub id: EntityId,
    pub points: Vec<f64>,
    #[serde(default)]
    pub color: SerializableColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl InkPath {
    /// Create a path from sampled points.
    pub fn from_points(points: &[Point], color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: points.iter().flat_map(|p| [p.x, p.y]).collect(),
            color,
            stroke_width,
            fill: None,
            opacity: None,
        }
    }

    /// Iterate the samples as points.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        flat_points(&self.points)
    }

    /// Number of (x, y) samples.
    pub fn point_count(&self) -> usize {
        self.points.len() / 2
    }

    /// Whether the path has enough samples to be committed.
    pub fn is_valid(&self) -> bool {
        self.point_count() >= MIN_PATH_POINTS
    }

    /// Opacity with the implicit default of 1.0.
    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0)
    }

    /// Bounds of the samples (not including stroke width).
    pub fn bounds(&self) -> Rect {
        points_bounds(self.vertices()).unwrap_or(Rect::ZERO)
    }

    /// True if any segment lies within `tolerance` of `point`.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let vertices: Vec<Point> = self.vertices().collect();
        vertices
            .windows(2)
            .any(|w| point_to_segment_distance(point, w[0], w[1]) <= tolerance)
    }
}
