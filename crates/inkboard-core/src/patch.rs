//! Partial field updates for shapes and paths.

use crate::path::InkPath;
use crate::shapes::{ImageFilter, SerializableColor, Shape, ShapeKind};
use serde::{Deserialize, Serialize};

/// A partial update addressed to one entity.
///
/// Unset fields are left untouched. Paths only honour `stroke`,
/// `stroke_width`, `opacity` and `fill`; other fields are ignored for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<SerializableColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<SerializableColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ImageFilter>,
}

impl EntityPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the patch sets nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The geometric fields of a shape (origin, size or endpoints).
    ///
    /// Used to forward the result of a drag or resize.
    pub fn geometry_of(shape: &Shape) -> Self {
        let mut patch = Self {
            x: Some(shape.x),
            y: Some(shape.y),
            ..Self::default()
        };
        match &shape.kind {
            ShapeKind::Arrow { points } | ShapeKind::Line { points } => {
                patch.points = Some(*points);
            }
            _ => {
                if let Some((width, height)) = shape.size() {
                    patch.width = Some(width);
                    patch.height = Some(height);
                }
            }
        }
        patch
    }

    pub fn with_stroke(mut self, color: SerializableColor) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Apply to a shape. Returns `true` if anything changed.
    pub fn apply_to_shape(&self, shape: &mut Shape) -> bool {
        let before = shape.clone();

        if let Some(x) = self.x {
            shape.x = x;
        }
        if let Some(y) = self.y {
            shape.y = y;
        }
        if let Some(stroke) = self.stroke {
            shape.stroke = stroke;
        }
        if let Some(width) = self.stroke_width {
            shape.stroke_width = width;
        }
        if let Some(opacity) = self.opacity {
            shape.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(rotation) = self.rotation {
            shape.rotation = rotation;
        }

        match &mut shape.kind {
            ShapeKind::Rectangle { width, height, fill } | ShapeKind::Circle { width, height, fill } => {
                set(width, self.width);
                set(height, self.height);
                if self.fill.is_some() {
                    *fill = self.fill;
                }
            }
            ShapeKind::Arrow { points } | ShapeKind::Line { points } => {
                set(points, self.points);
            }
            ShapeKind::Text(text) => {
                set(&mut text.width, self.width);
                set(&mut text.height, self.height);
                if let Some(content) = &self.text {
                    text.text = content.clone();
                }
                if let Some(family) = &self.font_family {
                    text.font_family = family.clone();
                }
                set(&mut text.font_size, self.font_size);
                if self.background_color.is_some() {
                    text.background_color = self.background_color;
                }
                set(&mut text.bold, self.bold);
                set(&mut text.italic, self.italic);
                set(&mut text.underline, self.underline);
                set(&mut text.strikethrough, self.strikethrough);
            }
            ShapeKind::Image(image) => {
                set(&mut image.width, self.width);
                set(&mut image.height, self.height);
                set(&mut image.filter, self.filter);
            }
        }

        *shape != before
    }

    /// Apply to a path. Returns `true` if anything changed.
    pub fn apply_to_path(&self, path: &mut InkPath) -> bool {
        let before = path.clone();
        if let Some(color) = self.stroke {
            path.color = color;
        }
        if let Some(width) = self.stroke_width {
            path.stroke_width = width;
        }
        if let Some(opacity) = self.opacity {
            path.opacity = Some(opacity.clamp(0.0, 1.0));
        }
        if self.fill.is_some() {
            path.fill = self.fill;
        }
        *path != before
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}
