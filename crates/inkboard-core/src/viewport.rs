//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed viewport scale.
pub const MIN_SCALE: f64 = 0.1;
/// Largest allowed viewport scale.
pub const MAX_SCALE: f64 = 5.0;

/// Viewport manages the view transform for the canvas.
///
/// Canvas space maps to the surface as `surface = canvas * scale + offset`,
/// so client input converts back with `(client - offset) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ViewportFields")]
pub struct Viewport {
    /// Current translation offset (pan) in surface pixels.
    pub offset: Vec2,
    /// Current zoom level; always within `[min_scale, max_scale]`.
    scale: f64,
    /// Minimum allowed zoom level
    pub min_scale: f64,
    /// Maximum allowed zoom level
    pub max_scale: f64,
}

/// Deserialized form of [`Viewport`], re-clamped on conversion.
#[derive(Deserialize)]
struct ViewportFields {
    offset: Vec2,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
}

impl From<ViewportFields> for Viewport {
    fn from(fields: ViewportFields) -> Self {
        let mut viewport = Viewport::with_scale_bounds(fields.min_scale, fields.max_scale);
        viewport.offset = fields.offset;
        viewport.set_scale(fields.scale);
        viewport
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom zoom bounds.
    ///
    /// The bounds may narrow `[MIN_SCALE, MAX_SCALE]` but never widen it.
    pub fn with_scale_bounds(min_scale: f64, max_scale: f64) -> Self {
        let min_scale = if min_scale.is_nan() {
            MIN_SCALE
        } else {
            min_scale.clamp(MIN_SCALE, MAX_SCALE)
        };
        let max_scale = if max_scale.is_nan() {
            MAX_SCALE
        } else {
            max_scale.clamp(min_scale, MAX_SCALE)
        };
        let mut viewport = Self {
            min_scale,
            max_scale,
            ..Self::default()
        };
        viewport.reset();
        viewport
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the zoom level, clamped to the allowed range.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.clamp(self.min_scale, self.max_scale);
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts canvas coordinates to surface coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a client point to canvas coordinates.
    pub fn screen_to_canvas(&self, client: Point) -> Point {
        Point::new(
            (client.x - self.offset.x) / self.scale,
            (client.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a canvas point to client coordinates.
    pub fn canvas_to_screen(&self, canvas: Point) -> Point {
        self.transform() * canvas
    }

    /// Pan the viewport by a delta in client pixels.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom the viewport, keeping the given client point fixed.
    pub fn zoom_at(&mut self, client: Point, factor: f64) {
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - self.scale).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_canvas(client);
        self.scale = new_scale;

        // Adjust offset so the anchor stays under the pointer
        let moved = self.canvas_to_screen(anchor);
        self.offset += client - moved;
    }

    /// Reset viewport to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0_f64.clamp(self.min_scale, self.max_scale);
    }

    /// The canvas-space rectangle visible on a surface of the given size.
    pub fn visible_rect(&self, surface: Size) -> Rect {
        let tl = self.screen_to_canvas(Point::ZERO);
        let br = self.screen_to_canvas(Point::new(surface.width, surface.height));
        Rect::from_points(tl, br)
    }

    /// Fit the viewport to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, surface: Size, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (surface.width - padding * 2.0).max(1.0),
            (surface.height - padding * 2.0).max(1.0),
        );
        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.set_scale(scale_x.min(scale_y));

        let center = bounds.center();
        self.offset = Vec2::new(
            surface.width / 2.0 - center.x * self.scale,
            surface.height / 2.0 - center.y * self.scale,
        );
    }
}
