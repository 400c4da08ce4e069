//! Vello-based renderer implementation.

use crate::compose::compose;
use crate::filters::ImageCache;
use crate::renderer::{RenderContext, Renderer};
use crate::surface::{ImageSource, Surface, TextMetrics, TextStyle};
use image::RgbaImage;
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Size, Stroke};
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, Layout, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use std::sync::Arc;
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Font context for text rendering (system fonts, loaded once).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Surface size of the frame being built.
    size: Size,
    /// Decoded, filtered images keyed by shape.
    image_cache: ImageCache<peniko::ImageData>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_image_data(rgba: RgbaImage) -> peniko::ImageData {
    let (width, height) = rgba.dimensions();
    peniko::ImageData {
        data: peniko::Blob::new(Arc::new(rgba.into_vec())),
        format: peniko::ImageFormat::Rgba8,
        width,
        height,
        alpha_type: peniko::ImageAlphaType::Alpha,
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            size: Size::ZERO,
            image_cache: ImageCache::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Number of cached image variants.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    /// Lay out a single line of text.
    fn layout(&mut self, text: &str, style: &TextStyle) -> Layout<Brush> {
        let brush = Brush::Solid(style.color);
        let weight = if style.bold {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        };

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.size as f32));
        builder.push_default(StyleProperty::Brush(brush));
        builder.push_default(StyleProperty::FontWeight(weight));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(
            style.family.clone().into(),
        )));
        if style.italic {
            builder.push_default(StyleProperty::FontStyle(parley::FontStyle::Italic));
        }
        let mut layout = builder.build(text);

        layout.break_all_lines(None);
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());
        layout
    }

    /// Render a placeholder for images that couldn't be loaded.
    fn render_image_placeholder(&mut self, bounds: Rect, transform: Affine) {
        // Draw a gray rectangle with an X
        let rect_path = bounds.to_path(0.1);
        self.scene.fill(Fill::NonZero, transform, Color::from_rgba8(200, 200, 200, 255), None, &rect_path);

        let stroke = Stroke::new(2.0);
        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(bounds.x0, bounds.y0));
        x_path.line_to(Point::new(bounds.x1, bounds.y1));
        x_path.move_to(Point::new(bounds.x1, bounds.y0));
        x_path.line_to(Point::new(bounds.x0, bounds.y1));
        self.scene.stroke(&stroke, transform, Color::from_rgba8(150, 150, 150, 255), None, &x_path);

        // Draw border
        self.scene.stroke(&stroke, transform, Color::from_rgba8(100, 100, 100, 255), None, &rect_path);
    }
}

impl Surface for VelloRenderer {
    fn clear(&mut self, color: Color) {
        self.scene.reset();
        let rect = Rect::from_origin_size(Point::ZERO, self.size);
        self.scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &rect);
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        self.scene.fill(Fill::NonZero, transform, color, None, path);
    }

    fn stroke(&mut self, transform: Affine, style: &Stroke, color: Color, path: &BezPath) {
        self.scene.stroke(style, transform, color, None, path);
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics {
        if text.is_empty() {
            return TextMetrics {
                width: 0.0,
                height: style.line_height(),
                baseline: style.size,
            };
        }
        let layout = self.layout(text, style);
        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline as f64)
            .unwrap_or(style.size);
        TextMetrics {
            width: layout.width() as f64,
            height: layout.height() as f64,
            baseline,
        }
    }

    fn draw_text(&mut self, transform: Affine, origin: Point, text: &str, style: &TextStyle) {
        let layout = self.layout(text, style);
        let brush = Brush::Solid(style.color);
        let text_transform = transform * Affine::translate((origin.x, origin.y));

        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }

    fn draw_image(&mut self, transform: Affine, image: &ImageSource<'_>, dest: Rect) {
        let Some(image_data) = self.image_cache.get_or_load(image, to_image_data).cloned() else {
            self.render_image_placeholder(dest, transform);
            return;
        };
        if image_data.width == 0 || image_data.height == 0 {
            return;
        }

        let scale_x = dest.width() / image_data.width as f64;
        let scale_y = dest.height() / image_data.height as f64;
        let image_transform = transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        let mut brush = peniko::ImageBrush::from(image_data);
        brush.sampler.alpha = image.opacity.clamp(0.0, 1.0) as f32;
        self.scene.draw_image(&brush, image_transform);
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.size = ctx.surface_size;
        compose(ctx, self);

        let document = ctx.canvas.document();
        self.image_cache.retain(|id| document.shape(id).is_some());
    }
}
