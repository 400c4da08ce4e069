//! Shape definitions for the canvas.
//!
//! Every shape shares a common envelope (id, origin, stroke, opacity,
//! rotation) and carries a variant-specific payload in [`ShapeKind`].

mod image;
mod text;

pub use image::{ImageFilter, ImageShape, decode_data_url};
pub use text::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, LINE_HEIGHT, TextShape, text_lines};

use crate::geometry::rect_contains;
use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for shapes and paths.
pub type EntityId = Uuid;

/// Default stroke width for new shapes and paths.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Serializable color representation (RGBA8), stored as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, c) in rgb.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::new(rgb[0], rgb[1], rgb[2], 255))
            }
            6 => Some(Self::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                255,
            )),
            8 => Some(Self::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
                channel(hex.get(6..8)?)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Get the color with an opacity multiplier applied to alpha.
    pub fn with_opacity(&self, opacity: f64) -> Color {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(self.r, self.g, self.b, alpha)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

pub(crate) fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

pub(crate) fn default_opacity() -> f64 {
    1.0
}

/// Variant-specific shape payload.
///
/// Arrow and line endpoints are stored relative to the shape origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle {
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<SerializableColor>,
    },
    Circle {
        width: f64,
        height: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fill: Option<SerializableColor>,
    },
    Arrow {
        points: [f64; 4],
    },
    Line {
        points: [f64; 4],
    },
    Text(TextShape),
    Image(ImageShape),
}

impl ShapeKind {
    /// Lowercase variant name, matching the serialized tag.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Arrow { .. } => "arrow",
            ShapeKind::Line { .. } => "line",
            ShapeKind::Text(_) => "text",
            ShapeKind::Image(_) => "image",
        }
    }

    /// Whether this variant is defined by a segment rather than a box.
    pub fn is_segment(&self) -> bool {
        matches!(self, ShapeKind::Arrow { .. } | ShapeKind::Line { .. })
    }
}

/// A shape on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub stroke: SerializableColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Rotation in degrees about [`Shape::rotation_center`].
    #[serde(default)]
    pub rotation: f64,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    /// Create a shape with default styling at the given origin.
    pub fn new(origin: Point, kind: ShapeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: origin.x,
            y: origin.y,
            stroke: SerializableColor::black(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            opacity: 1.0,
            rotation: 0.0,
            kind,
        }
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ShapeKind::Rectangle {
                width,
                height,
                fill: None,
            },
        )
    }

    pub fn circle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            Point::new(x, y),
            ShapeKind::Circle {
                width,
                height,
                fill: None,
            },
        )
    }

    pub fn line(start: Point, end: Point) -> Self {
        let d = end - start;
        Self::new(start, ShapeKind::Line { points: [0.0, 0.0, d.x, d.y] })
    }

    pub fn arrow(start: Point, end: Point) -> Self {
        let d = end - start;
        Self::new(start, ShapeKind::Arrow { points: [0.0, 0.0, d.x, d.y] })
    }

    pub fn text(origin: Point, text: TextShape) -> Self {
        Self::new(origin, ShapeKind::Text(text))
    }

    pub fn image(origin: Point, image: ImageShape) -> Self {
        Self::new(origin, ShapeKind::Image(image))
    }

    /// Set the stroke color (builder).
    pub fn with_stroke(mut self, stroke: SerializableColor) -> Self {
        self.stroke = stroke;
        self
    }

    /// Set the stroke width (builder).
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Set the rotation in degrees (builder).
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.x = origin.x;
        self.y = origin.y;
    }

    /// Absolute endpoints for arrows and lines.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match &self.kind {
            ShapeKind::Arrow { points } | ShapeKind::Line { points } => Some((
                Point::new(self.x + points[0], self.y + points[1]),
                Point::new(self.x + points[2], self.y + points[3]),
            )),
            _ => None,
        }
    }

    /// Box size for box-like variants (may be negative while a drag is in progress).
    pub fn size(&self) -> Option<(f64, f64)> {
        match &self.kind {
            ShapeKind::Rectangle { width, height, .. } | ShapeKind::Circle { width, height, .. } => {
                Some((*width, *height))
            }
            ShapeKind::Text(text) => Some((text.width, text.height)),
            ShapeKind::Image(image) => Some((image.width, image.height)),
            ShapeKind::Arrow { .. } | ShapeKind::Line { .. } => None,
        }
    }

    /// Un-rotated axis-aligned bounds in canvas space.
    pub fn bounds(&self) -> Rect {
        if let Some((start, end)) = self.endpoints() {
            return Rect::from_points(start, end);
        }
        let (width, height) = self.size().unwrap_or((0.0, 0.0));
        Rect::new(self.x, self.y, self.x + width, self.y + height).abs()
    }

    /// The point rotation is applied about: the bounding-box center, or the
    /// segment midpoint for arrows and lines.
    pub fn rotation_center(&self) -> Point {
        match self.endpoints() {
            Some((start, end)) => start.midpoint(end),
            None => self.bounds().center(),
        }
    }

    /// Un-rotated containment test used for picking.
    ///
    /// Segment shapes get a slop of half their stroke width so horizontal and
    /// vertical lines remain pickable.
    pub fn contains(&self, point: Point) -> bool {
        let bounds = self.bounds();
        let bounds = if self.kind.is_segment() {
            let slop = self.stroke_width / 2.0;
            bounds.inflate(slop, slop)
        } else {
            bounds
        };
        rect_contains(bounds, point)
    }

    /// True if the shape has no extent (zero width or height, or coincident endpoints).
    pub fn is_degenerate(&self) -> bool {
        match self.endpoints() {
            Some((start, end)) => (end - start).hypot2() < f64::EPSILON,
            None => {
                let (width, height) = self.size().unwrap_or((0.0, 0.0));
                width.abs() < f64::EPSILON || height.abs() < f64::EPSILON
            }
        }
    }

    /// Rewrite negative box sizes so that the origin is the top-left corner.
    pub fn normalize(&mut self) {
        if self.kind.is_segment() {
            return;
        }
        let bounds = self.bounds();
        self.set_bounds(bounds);
    }

    /// Fit the shape to new un-rotated bounds.
    ///
    /// Box variants take the rectangle directly. Segment variants map each
    /// endpoint proportionally from the old bounds into the new ones.
    pub fn set_bounds(&mut self, bounds: Rect) {
        let bounds = bounds.abs();
        if let Some((start, end)) = self.endpoints() {
            let old = self.bounds();
            let map = |p: Point| {
                let tx = if old.width() > f64::EPSILON { (p.x - old.x0) / old.width() } else { 0.0 };
                let ty = if old.height() > f64::EPSILON { (p.y - old.y0) / old.height() } else { 0.0 };
                Point::new(bounds.x0 + tx * bounds.width(), bounds.y0 + ty * bounds.height())
            };
            let (start, end) = (map(start), map(end));
            self.set_endpoints(start, end);
            return;
        }

        self.x = bounds.x0;
        self.y = bounds.y0;
        let (w, h) = (bounds.width(), bounds.height());
        match &mut self.kind {
            ShapeKind::Rectangle { width, height, .. } | ShapeKind::Circle { width, height, .. } => {
                *width = w;
                *height = h;
            }
            ShapeKind::Text(text) => {
                text.width = w;
                text.height = h;
            }
            ShapeKind::Image(image) => {
                image.width = w;
                image.height = h;
            }
            ShapeKind::Arrow { .. } | ShapeKind::Line { .. } => {}
        }
    }

    /// Move the end of a box-like shape to `corner`, keeping the origin.
    ///
    /// For segment shapes this moves the second endpoint.
    pub fn extend_to(&mut self, corner: Point) {
        let d = corner - self.origin();
        match &mut self.kind {
            ShapeKind::Rectangle { width, height, .. } | ShapeKind::Circle { width, height, .. } => {
                *width = d.x;
                *height = d.y;
            }
            ShapeKind::Text(text) => {
                text.width = d.x;
                text.height = d.y;
            }
            ShapeKind::Image(image) => {
                image.width = d.x;
                image.height = d.y;
            }
            ShapeKind::Arrow { points } | ShapeKind::Line { points } => {
                points[2] = d.x;
                points[3] = d.y;
            }
        }
    }

    /// Place both endpoints of a segment shape; the origin moves to `start`.
    pub fn set_endpoints(&mut self, start: Point, end: Point) {
        if let ShapeKind::Arrow { points } | ShapeKind::Line { points } = &mut self.kind {
            self.x = start.x;
            self.y = start.y;
            let d = end - start;
            *points = [0.0, 0.0, d.x, d.y];
        }
    }

    pub fn as_text(&self) -> Option<&TextShape> {
        match &self.kind {
            ShapeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageShape> {
        match &self.kind {
            ShapeKind::Image(image) => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_roundtrip() {
        let c = SerializableColor::new(0x12, 0xab, 0xff, 255);
        assert_eq!(c.to_hex(), "#12abff");
        assert_eq!(SerializableColor::from_hex("#12abff"), Some(c));
        let translucent = SerializableColor::new(1, 2, 3, 128);
        assert_eq!(translucent.to_hex(), "#01020380");
        assert_eq!(SerializableColor::from_hex("#01020380"), Some(translucent));
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(SerializableColor::from_hex("nope"), None);
    }

    #[test]
    fn test_with_opacity() {
        let c = SerializableColor::black().with_opacity(0.5);
        assert_eq!(c.to_rgba8().a, 128);
    }

    #[test]
    fn test_rectangle_bounds_normalized() {
        let shape = Shape::rectangle(100.0, 50.0, -40.0, -20.0);
        assert_eq!(shape.bounds(), Rect::new(60.0, 30.0, 100.0, 50.0));
    }

    #[test]
    fn test_normalize_negative_size() {
        let mut shape = Shape::rectangle(100.0, 50.0, -40.0, -20.0);
        shape.normalize();
        assert!((shape.x - 60.0).abs() < f64::EPSILON);
        assert!((shape.y - 30.0).abs() < f64::EPSILON);
        assert_eq!(shape.size(), Some((40.0, 20.0)));
    }

    #[test]
    fn test_line_bounds_and_center() {
        let shape = Shape::line(Point::new(10.0, 40.0), Point::new(50.0, 20.0));
        assert_eq!(shape.bounds(), Rect::new(10.0, 20.0, 50.0, 40.0));
        assert_eq!(shape.rotation_center(), Point::new(30.0, 30.0));
    }

    #[test]
    fn test_degenerate() {
        assert!(Shape::rectangle(0.0, 0.0, 0.0, 10.0).is_degenerate());
        assert!(!Shape::rectangle(0.0, 0.0, 5.0, 10.0).is_degenerate());
        assert!(Shape::arrow(Point::new(3.0, 3.0), Point::new(3.0, 3.0)).is_degenerate());
        assert!(!Shape::line(Point::ZERO, Point::new(0.0, 4.0)).is_degenerate());
    }

    #[test]
    fn test_horizontal_line_is_pickable() {
        let shape = Shape::line(Point::new(0.0, 10.0), Point::new(100.0, 10.0));
        assert!(shape.contains(Point::new(50.0, 10.5)));
        assert!(!shape.contains(Point::new(50.0, 20.0)));
    }

    #[test]
    fn test_set_bounds_segment_maps_endpoints() {
        let mut shape = Shape::arrow(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        shape.set_bounds(Rect::new(0.0, 0.0, 20.0, 40.0));
        let (start, end) = shape.endpoints().unwrap();
        assert_eq!(start, Point::new(0.0, 0.0));
        assert_eq!(end, Point::new(20.0, 40.0));
    }

    #[test]
    fn test_extend_to() {
        let mut shape = Shape::rectangle(10.0, 10.0, 0.0, 0.0);
        shape.extend_to(Point::new(110.0, 60.0));
        assert_eq!(shape.size(), Some((100.0, 50.0)));

        let mut arrow = Shape::arrow(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        arrow.extend_to(Point::new(15.0, 25.0));
        assert_eq!(arrow.endpoints().unwrap().1, Point::new(15.0, 25.0));
    }

    #[test]
    fn test_serde_shape_json_shape() {
        let shape = Shape::rectangle(1.0, 2.0, 3.0, 4.0).with_rotation(45.0);
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "rectangle");
        assert_eq!(json["strokeWidth"], 2.0);
        assert_eq!(json["stroke"], "#000000");
        assert_eq!(json["rotation"], 45.0);
        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }

    #[test]
    fn test_serde_defaults_for_missing_fields() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","x":5,"y":6,"type":"line","points":[0,0,10,10]}"#;
        let shape: Shape = serde_json::from_str(json).unwrap();
        assert!((shape.opacity - 1.0).abs() < f64::EPSILON);
        assert!((shape.stroke_width - DEFAULT_STROKE_WIDTH).abs() < f64::EPSILON);
        assert!(shape.rotation.abs() < f64::EPSILON);
        assert_eq!(shape.kind.name(), "line");
    }
}
