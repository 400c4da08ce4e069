//! Tool selection and the style applied to newly created entities.

use crate::config::EngineConfig;
use crate::path::InkPath;
use crate::shapes::{SerializableColor, Shape, ShapeKind};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Pen,
    Eraser,
    Text,
    Rectangle,
    Circle,
    Arrow,
    Line,
}

impl ToolKind {
    /// Tools that create a shape by dragging out a box or segment.
    pub fn is_shape_tool(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Arrow | ToolKind::Line
        )
    }
}

/// Manages the current tool and the style for new entities.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    /// Fill for new rectangles and circles.
    pub fill: Option<SerializableColor>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            current_tool: ToolKind::default(),
            stroke: config.default_stroke,
            stroke_width: config.default_stroke_width,
            fill: None,
        }
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Zero-size shape for the current tool anchored at `anchor`, or `None`
    /// if the tool does not draw shapes.
    pub fn pending_shape(&self, anchor: Point) -> Option<Shape> {
        let shape = match self.current_tool {
            ToolKind::Rectangle => Shape::rectangle(anchor.x, anchor.y, 0.0, 0.0),
            ToolKind::Circle => Shape::circle(anchor.x, anchor.y, 0.0, 0.0),
            ToolKind::Arrow => Shape::arrow(anchor, anchor),
            ToolKind::Line => Shape::line(anchor, anchor),
            _ => return None,
        };
        let mut shape = shape
            .with_stroke(self.stroke)
            .with_stroke_width(self.stroke_width);
        if let ShapeKind::Rectangle { fill, .. } | ShapeKind::Circle { fill, .. } = &mut shape.kind {
            *fill = self.fill;
        }
        Some(shape)
    }

    /// Path for the current style from sampled points.
    pub fn ink_path(&self, points: &[Point]) -> InkPath {
        InkPath::from_points(points, self.stroke, self.stroke_width)
    }
}
