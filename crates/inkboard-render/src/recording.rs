//! Headless surface that records draw calls.
//!
//! Text is measured with the same per-glyph estimate the core model uses for
//! text boxes, so layouts are stable without any fonts installed.

use crate::compose::compose;
use crate::renderer::{RenderContext, Renderer};
use crate::surface::{ImageSource, Surface, TextMetrics, TextStyle};
use inkboard_core::shapes::{EntityId, ImageFilter, SerializableColor, TextShape};
use kurbo::{Affine, BezPath, Point, Rect, Stroke};
use peniko::Color;

/// Baseline position as a fraction of the font size.
const APPROX_ASCENT: f64 = 0.8;

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        color: SerializableColor,
    },
    Fill {
        transform: Affine,
        color: SerializableColor,
        path: BezPath,
    },
    Stroke {
        transform: Affine,
        width: f64,
        dashed: bool,
        color: SerializableColor,
        path: BezPath,
    },
    Text {
        transform: Affine,
        origin: Point,
        text: String,
        size: f64,
        bold: bool,
        italic: bool,
        color: SerializableColor,
    },
    Image {
        transform: Affine,
        id: EntityId,
        filter: ImageFilter,
        opacity: f64,
        dest: Rect,
    },
}

impl DrawOp {
    pub fn name(&self) -> &'static str {
        match self {
            DrawOp::Clear { .. } => "clear",
            DrawOp::Fill { .. } => "fill",
            DrawOp::Stroke { .. } => "stroke",
            DrawOp::Text { .. } => "text",
            DrawOp::Image { .. } => "image",
        }
    }

    /// The transform the op was drawn with (`None` for clears).
    pub fn transform(&self) -> Option<Affine> {
        match self {
            DrawOp::Clear { .. } => None,
            DrawOp::Fill { transform, .. }
            | DrawOp::Stroke { transform, .. }
            | DrawOp::Text { transform, .. }
            | DrawOp::Image { transform, .. } => Some(*transform),
        }
    }
}

/// Display list recorder.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        self.ops.clear();
        self.ops.push(DrawOp::Clear { color: color.into() });
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        self.ops.push(DrawOp::Fill {
            transform,
            color: color.into(),
            path: path.clone(),
        });
    }

    fn stroke(&mut self, transform: Affine, style: &Stroke, color: Color, path: &BezPath) {
        self.ops.push(DrawOp::Stroke {
            transform,
            width: style.width,
            dashed: !style.dash_pattern.is_empty(),
            color: color.into(),
            path: path.clone(),
        });
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics {
        let (width, height) = TextShape::estimated_size(text, style.size);
        TextMetrics {
            width,
            height,
            baseline: style.size * APPROX_ASCENT,
        }
    }

    fn draw_text(&mut self, transform: Affine, origin: Point, text: &str, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            transform,
            origin,
            text: text.to_string(),
            size: style.size,
            bold: style.bold,
            italic: style.italic,
            color: style.color.into(),
        });
    }

    fn draw_image(&mut self, transform: Affine, image: &ImageSource<'_>, dest: Rect) {
        self.ops.push(DrawOp::Image {
            transform,
            id: image.id,
            filter: image.filter,
            opacity: image.opacity,
            dest,
        });
    }
}

impl Renderer for RecordingSurface {
    fn build_scene(&mut self, ctx: &RenderContext) {
        compose(ctx, self);
    }
}
