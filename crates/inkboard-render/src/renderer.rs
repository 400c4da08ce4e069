//! Frame context shared by every rendering backend.

use inkboard_core::canvas::Canvas;
use kurbo::{Affine, Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Errors raised while preparing frame resources.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("image source is not a base64 data URL")]
    NotDataUrl,
    #[error("image decode failed: {0}")]
    ImageDecode(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RendererError>;

/// Background grid drawn beneath the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridStyle {
    None,
    #[default]
    Lines,
    /// A small `+` at every intersection.
    CrossPlus,
    Dots,
}

/// Colors for everything that is not part of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Color,
    /// Dashed selection outline and handle borders.
    pub selection: Color,
    /// Snap and persistent guide lines.
    pub guide: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(250, 250, 250, 255),
            selection: Color::from_rgba8(59, 130, 246, 255),
            guide: Color::from_rgba8(236, 72, 153, 180),
        }
    }
}

/// Everything a backend needs to draw one frame of a canvas.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub canvas: &'a Canvas,
    /// Surface size in physical pixels.
    pub surface_size: Size,
    /// Physical pixels per logical pixel.
    pub pixel_ratio: f64,
    pub grid: GridStyle,
    pub palette: Palette,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a Canvas, surface_size: Size) -> Self {
        Self {
            canvas,
            surface_size,
            pixel_ratio: 1.0,
            grid: GridStyle::default(),
            palette: Palette::default(),
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    pub fn with_grid(mut self, grid: GridStyle) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    fn ratio(&self) -> f64 {
        if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 }
    }

    /// Canvas space to physical surface pixels.
    pub fn world_transform(&self) -> Affine {
        Affine::scale(self.ratio()) * self.canvas.viewport.transform()
    }

    /// Physical pixels per canvas unit.
    pub fn zoom(&self) -> f64 {
        self.canvas.viewport.scale() * self.ratio()
    }

    /// The canvas-space rectangle covered by the surface.
    pub fn visible_rect(&self) -> Rect {
        let ratio = self.ratio();
        let logical = Size::new(self.surface_size.width / ratio, self.surface_size.height / ratio);
        self.canvas.viewport.visible_rect(logical)
    }
}

/// A backend that turns a [`RenderContext`] into its own frame representation.
pub trait Renderer {
    /// Rebuild the frame from scratch. Must not touch the model.
    fn build_scene(&mut self, ctx: &RenderContext);
}
