//! Resolve canvas points to shapes, paths and resize handles.
//!
//! Shapes are tested against their un-rotated bounds. Rotation is not
//! inverse-applied, matching how resize handles are placed.

use crate::document::{CanvasDocument, EntityRef};
use crate::path::InkPath;
use crate::selection::{ResizeHandle, handle_at};
use crate::shapes::{EntityId, Shape};
use kurbo::Point;

/// Topmost shape whose bounds contain `point`.
pub fn shape_at(shapes: &[Shape], point: Point) -> Option<EntityId> {
    shapes.iter().rev().find(|s| s.contains(point)).map(|s| s.id)
}

/// Path pick tolerance in canvas units: half the stroke width, divided by the viewport scale.
pub fn path_tolerance(path: &InkPath, scale: f64) -> f64 {
    (path.stroke_width / 2.0) / scale
}

/// Topmost path with a segment within tolerance of `point`.
pub fn path_at(paths: &[InkPath], point: Point, scale: f64) -> Option<EntityId> {
    paths
        .iter()
        .rev()
        .find(|p| p.hit_test(point, path_tolerance(p, scale)))
        .map(|p| p.id)
}

/// Topmost entity at `point`. Shapes render above paths, so they win.
pub fn entity_at(document: &CanvasDocument, point: Point, scale: f64) -> Option<EntityRef> {
    shape_at(&document.shapes, point)
        .map(EntityRef::Shape)
        .or_else(|| path_at(&document.paths, point, scale).map(EntityRef::Path))
}

/// Every entity under `point`, topmost first (shapes before paths).
pub fn entities_at(document: &CanvasDocument, point: Point, scale: f64) -> Vec<EntityRef> {
    let shapes = document
        .shapes
        .iter()
        .rev()
        .filter(|s| s.contains(point))
        .map(|s| EntityRef::Shape(s.id));
    let paths = document
        .paths
        .iter()
        .rev()
        .filter(|p| p.hit_test(point, path_tolerance(p, scale)))
        .map(|p| EntityRef::Path(p.id));
    shapes.chain(paths).collect()
}

/// Resize handle of `shape` under `point`. `handle_px` is the on-screen handle size.
pub fn resize_handle_at(shape: &Shape, point: Point, scale: f64, handle_px: f64) -> Option<ResizeHandle> {
    handle_at(shape.bounds(), point, handle_px / scale)
}
