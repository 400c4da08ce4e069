//! Text shape payload.

use super::SerializableColor;
use serde::{Deserialize, Serialize};

/// Default font family for new text.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Default font size for new text.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// Average glyph advance as a fraction of the font size, used when no
/// renderer measurement is available.
const APPROX_CHAR_WIDTH: f64 = 0.6;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

/// A block of text anchored at the shape origin (top-left).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    pub text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<SerializableColor>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
}

impl TextShape {
    /// Create text with the default font, sized by [`TextShape::estimated_size`].
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        let text = text.into();
        let (width, height) = Self::estimated_size(&text, font_size);
        Self {
            width,
            height,
            text,
            font_family: default_font_family(),
            font_size,
            background_color: None,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }

    /// Rough layout size for `text`: the longest line by glyph count, times the line count.
    pub fn estimated_size(text: &str, font_size: f64) -> (f64, f64) {
        let lines = text_lines(text).count();
        let longest = text_lines(text).map(|l| l.chars().count()).max().unwrap_or(0);
        (
            longest as f64 * font_size * APPROX_CHAR_WIDTH,
            lines as f64 * font_size * LINE_HEIGHT,
        )
    }
}

/// The lines a text shape is drawn as. A trailing newline starts an empty
/// last line, and an empty string is one empty line.
pub fn text_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}
