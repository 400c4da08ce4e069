//! Per-frame compositing pass.
//!
//! Drawing order is background, grid, guide lines, committed ink, the stroke
//! being drawn, committed shapes (each followed by its selection decoration)
//! and finally the shape being drawn. Every call goes through [`Surface`], so
//! the same pass drives the Vello backend and the recording surface.

use crate::renderer::{GridStyle, RenderContext};
use crate::surface::{ImageSource, Surface, TextMetrics, TextStyle};
use inkboard_core::config::EngineConfig;
use inkboard_core::geometry::rotation_about;
use inkboard_core::outline::{OutlineOptions, outline_to_path, stroke_outline};
use inkboard_core::path::InkPath;
use inkboard_core::selection::ResizeHandle;
use inkboard_core::shapes::{Shape, ShapeKind, TextShape, text_lines};
use inkboard_core::snap::GuideAxis;
use kurbo::{Affine, BezPath, Cap, Circle, Join, Point, Rect, Shape as KurboShape, Stroke, Vec2};
use peniko::Color;

/// Length of each arrow head segment, in canvas units.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;

/// Angle between the shaft and each arrow head segment, in degrees.
pub const ARROW_HEAD_ANGLE: f64 = 30.0;

/// Space between text and the edge of its background box.
pub const TEXT_BACKGROUND_PADDING: f64 = 4.0;

/// Dash length for guides and selection outlines, in surface pixels.
const DASH_PX: f64 = 4.0;

/// Draw one frame of `ctx.canvas` onto `surface`.
pub fn compose<S: Surface + ?Sized>(ctx: &RenderContext, surface: &mut S) {
    surface.clear(ctx.palette.background);

    let canvas = ctx.canvas;
    let config = canvas.config();
    let world = ctx.world_transform();

    render_grid(surface, ctx, world);
    render_guides(surface, ctx, world);

    for path in &canvas.document().paths {
        render_path(surface, world, path, config);
        if canvas.is_selected(path.id) {
            let inset = config.selection_padding + path.stroke_width;
            dashed_outline(surface, ctx, world, path.bounds().inflate(inset, inset));
        }
    }

    if let Some(points) = canvas.pending_stroke() {
        let ink = canvas.tools.ink_path(points);
        render_path(surface, world, &ink, config);
    }

    for shape in &canvas.document().shapes {
        render_shape(surface, ctx, world, shape, canvas.is_selected(shape.id));
    }

    if let Some(pending) = canvas.pending_shape() {
        render_shape(surface, ctx, world, pending, false);
    }
}

/// Grid bounds snapped outward to whole grid cells.
fn grid_bounds(visible: Rect, spacing: f64) -> Rect {
    Rect::new(
        (visible.x0 / spacing).floor() * spacing,
        (visible.y0 / spacing).floor() * spacing,
        (visible.x1 / spacing).ceil() * spacing,
        (visible.y1 / spacing).ceil() * spacing,
    )
}

fn render_grid<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext, transform: Affine) {
    let spacing = ctx.canvas.config().grid_spacing;
    if ctx.grid == GridStyle::None || spacing <= 0.0 {
        return;
    }
    let bounds = grid_bounds(ctx.visible_rect(), spacing);
    let mut path = BezPath::new();

    match ctx.grid {
        GridStyle::None => {}
        GridStyle::Lines => {
            let mut x = bounds.x0;
            while x <= bounds.x1 {
                path.move_to(Point::new(x, bounds.y0));
                path.line_to(Point::new(x, bounds.y1));
                x += spacing;
            }
            let mut y = bounds.y0;
            while y <= bounds.y1 {
                path.move_to(Point::new(bounds.x0, y));
                path.line_to(Point::new(bounds.x1, y));
                y += spacing;
            }
            surface.stroke(
                transform,
                &Stroke::new(0.5),
                Color::from_rgba8(200, 200, 200, 100),
                &path,
            );
        }
        GridStyle::CrossPlus => {
            let arm = 3.0;
            for_each_intersection(bounds, spacing, |p| {
                path.move_to(Point::new(p.x - arm, p.y));
                path.line_to(Point::new(p.x + arm, p.y));
                path.move_to(Point::new(p.x, p.y - arm));
                path.line_to(Point::new(p.x, p.y + arm));
            });
            surface.stroke(
                transform,
                &Stroke::new(1.0),
                Color::from_rgba8(180, 180, 180, 60),
                &path,
            );
        }
        GridStyle::Dots => {
            let half = 1.5;
            for_each_intersection(bounds, spacing, |p| {
                path.extend(Rect::from_center_size(p, (half * 2.0, half * 2.0)).path_elements(0.1));
            });
            surface.fill(transform, Color::from_rgba8(160, 160, 160, 70), &path);
        }
    }
}

fn for_each_intersection(bounds: Rect, spacing: f64, mut f: impl FnMut(Point)) {
    let mut x = bounds.x0;
    while x <= bounds.x1 {
        let mut y = bounds.y0;
        while y <= bounds.y1 {
            f(Point::new(x, y));
            y += spacing;
        }
        x += spacing;
    }
}

/// Stroke that stays `width_px` wide and dashed on screen at any zoom.
fn screen_dashed(ctx: &RenderContext, width_px: f64) -> Stroke {
    let zoom = ctx.zoom();
    let dash = DASH_PX / zoom;
    Stroke::new(width_px / zoom).with_dashes(0.0, &[dash, dash])
}

fn render_guides<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext, transform: Affine) {
    let guides = ctx.canvas.guides();
    if guides.is_empty() {
        return;
    }
    let visible = ctx.visible_rect();
    let stroke = screen_dashed(ctx, 1.0);

    for guide in guides {
        let mut path = BezPath::new();
        match guide.axis {
            GuideAxis::Vertical => {
                path.move_to(Point::new(guide.position, visible.y0));
                path.line_to(Point::new(guide.position, visible.y1));
            }
            GuideAxis::Horizontal => {
                path.move_to(Point::new(visible.x0, guide.position));
                path.line_to(Point::new(visible.x1, guide.position));
            }
        }
        surface.stroke(transform, &stroke, ctx.palette.guide, &path);
    }
}

/// Fill an ink path's tapered outline, plus its enclosed polygon when it has a fill.
pub fn render_path<S: Surface + ?Sized>(
    surface: &mut S,
    transform: Affine,
    path: &InkPath,
    config: &EngineConfig,
) {
    let points: Vec<Point> = path.vertices().collect();
    let opacity = path.effective_opacity();

    if let Some(fill) = path.fill {
        if points.len() >= 3 {
            let polygon = polyline(&points, true);
            surface.fill(transform, fill.with_opacity(opacity), &polygon);
        }
    }

    let options = OutlineOptions::new(
        path.stroke_width * config.path_width_multiplier,
        config.path_thinning,
    );
    let outline = stroke_outline(&points, &options);
    if outline.is_empty() {
        return;
    }
    surface.fill(transform, path.color.with_opacity(opacity), &outline_to_path(&outline));
}

fn polyline(points: &[Point], closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(*first);
    for &p in rest {
        path.line_to(p);
    }
    if closed {
        path.close_path();
    }
    path
}

/// Shaft plus a two-segment head at `end`.
pub fn arrow_path(start: Point, end: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(start);
    path.line_to(end);

    let shaft = end - start;
    if shaft.hypot() > f64::EPSILON {
        let angle = shaft.y.atan2(shaft.x);
        for side in [-1.0, 1.0] {
            let a = angle + side * ARROW_HEAD_ANGLE.to_radians();
            path.move_to(end);
            path.line_to(end - Vec2::new(a.cos(), a.sin()) * ARROW_HEAD_LENGTH);
        }
    }
    path
}

/// Draw a shape's primitive and, when selected, its selection decoration.
///
/// The rotation transform is built once and shared by both.
pub fn render_shape<S: Surface + ?Sized>(
    surface: &mut S,
    ctx: &RenderContext,
    world: Affine,
    shape: &Shape,
    selected: bool,
) {
    let transform = world * rotation_about(shape.rotation_center(), shape.rotation);
    let color = shape.stroke.with_opacity(shape.opacity);
    let stroke = Stroke::new(shape.stroke_width)
        .with_caps(Cap::Round)
        .with_join(Join::Round);

    match &shape.kind {
        ShapeKind::Rectangle { fill, .. } => {
            let path = shape.bounds().to_path(0.1);
            if let Some(fill) = fill {
                surface.fill(transform, fill.with_opacity(shape.opacity), &path);
            }
            surface.stroke(transform, &stroke, color, &path);
        }
        ShapeKind::Circle { fill, .. } => {
            let bounds = shape.bounds();
            let radius = bounds.width().min(bounds.height()) / 2.0;
            let path = Circle::new(bounds.center(), radius).to_path(0.1);
            if let Some(fill) = fill {
                surface.fill(transform, fill.with_opacity(shape.opacity), &path);
            }
            surface.stroke(transform, &stroke, color, &path);
        }
        ShapeKind::Line { .. } | ShapeKind::Arrow { .. } => {
            if let Some((start, end)) = shape.endpoints() {
                let path = if matches!(shape.kind, ShapeKind::Arrow { .. }) {
                    arrow_path(start, end)
                } else {
                    polyline(&[start, end], false)
                };
                surface.stroke(transform, &stroke, color, &path);
            }
        }
        ShapeKind::Text(text) => {
            render_text(surface, transform, shape.origin(), text, color, shape.opacity);
        }
        ShapeKind::Image(image) => {
            let source = ImageSource {
                id: shape.id,
                src: &image.src,
                filter: image.filter,
                opacity: shape.opacity,
            };
            surface.draw_image(transform, &source, shape.bounds());
        }
    }

    if selected {
        render_selection(surface, ctx, transform, shape.bounds());
    }
}

fn render_text<S: Surface + ?Sized>(
    surface: &mut S,
    transform: Affine,
    origin: Point,
    text: &TextShape,
    color: Color,
    opacity: f64,
) {
    let mut style = TextStyle::new(&text.font_family, text.font_size, color);
    style.bold = text.bold;
    style.italic = text.italic;
    let line_height = style.line_height();

    let lines: Vec<&str> = text_lines(&text.text).collect();
    let metrics: Vec<TextMetrics> = lines
        .iter()
        .map(|line| surface.measure_text(line, &style))
        .collect();

    if let Some(background) = text.background_color {
        let width = metrics.iter().map(|m| m.width).fold(0.0, f64::max);
        let height = lines.len() as f64 * line_height;
        let rect = Rect::new(origin.x, origin.y, origin.x + width, origin.y + height)
            .inflate(TEXT_BACKGROUND_PADDING, TEXT_BACKGROUND_PADDING);
        surface.fill(transform, background.with_opacity(opacity), &rect.to_path(0.1));
    }

    let thickness = (text.font_size / 15.0).max(1.0);
    let decoration = Stroke::new(thickness);

    for (i, (line, m)) in lines.iter().zip(&metrics).enumerate() {
        if line.is_empty() {
            continue;
        }
        let top = Point::new(origin.x, origin.y + i as f64 * line_height);
        surface.draw_text(transform, top, line, &style);

        let baseline = top.y + m.baseline;
        if text.underline {
            let y = baseline + thickness * 1.5;
            let path = polyline(&[Point::new(top.x, y), Point::new(top.x + m.width, y)], false);
            surface.stroke(transform, &decoration, color, &path);
        }
        if text.strikethrough {
            let y = baseline - text.font_size * 0.3;
            let path = polyline(&[Point::new(top.x, y), Point::new(top.x + m.width, y)], false);
            surface.stroke(transform, &decoration, color, &path);
        }
    }
}

fn dashed_outline<S: Surface + ?Sized>(surface: &mut S, ctx: &RenderContext, transform: Affine, rect: Rect) {
    let stroke = screen_dashed(ctx, 1.0);
    surface.stroke(transform, &stroke, ctx.palette.selection, &rect.to_path(0.1));
}

/// Dashed outline around `bounds` plus the eight resize handles.
fn render_selection<S: Surface + ?Sized>(
    surface: &mut S,
    ctx: &RenderContext,
    transform: Affine,
    bounds: Rect,
) {
    let config = ctx.canvas.config();
    let padding = config.selection_padding;
    dashed_outline(surface, ctx, transform, bounds.inflate(padding, padding));

    // Handles live in canvas units so they line up with handle hit-testing.
    let size = config.handle_size / ctx.canvas.viewport.scale();
    let outline = Stroke::new(1.5 / ctx.zoom());
    for handle in ResizeHandle::ALL {
        let path = handle.rect(bounds, size).to_path(0.1);
        surface.fill(transform, Color::WHITE, &path);
        surface.stroke(transform, &outline, ctx.palette.selection, &path);
    }
}
