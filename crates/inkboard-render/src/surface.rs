//! Backend-agnostic drawing surface.

use inkboard_core::shapes::{EntityId, ImageFilter, LINE_HEIGHT};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;

/// Font selection and color for a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn new(family: impl Into<String>, size: f64, color: Color) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
            color,
        }
    }

    /// Height of one line of text.
    pub fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT
    }
}

/// Measured extent of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the line box to the baseline.
    pub baseline: f64,
}

/// An image to draw, identified by its shape so backends can cache the
/// decoded pixels.
#[derive(Debug, Clone, Copy)]
pub struct ImageSource<'a> {
    pub id: EntityId,
    /// Data URL or bare base64 payload.
    pub src: &'a str,
    pub filter: ImageFilter,
    pub opacity: f64,
}

/// Drawing primitives the compositing pass is expressed in.
///
/// Transforms map canvas coordinates to surface pixels.
pub trait Surface {
    /// Reset the surface to a solid color.
    fn clear(&mut self, color: Color);

    /// Fill a path (non-zero winding).
    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath);

    /// Stroke a path.
    fn stroke(&mut self, transform: Affine, style: &Stroke, color: Color, path: &BezPath);

    /// Measure a single line of text.
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Draw a single line of text with its line box's top-left corner at `origin`.
    fn draw_text(&mut self, transform: Affine, origin: Point, text: &str, style: &TextStyle);

    /// Draw an image scaled into `dest`.
    fn draw_image(&mut self, transform: Affine, image: &ImageSource<'_>, dest: Rect);
}
