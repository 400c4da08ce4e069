//! Image shape payload.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// CSS-style filter applied when an image is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFilter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Invert,
}

impl ImageFilter {
    /// The CSS filter keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            ImageFilter::None => "none",
            ImageFilter::Grayscale => "grayscale",
            ImageFilter::Sepia => "sepia",
            ImageFilter::Invert => "invert",
        }
    }
}

/// An image drawn into a box anchored at the shape origin.
///
/// `src` is a data URL (`data:image/png;base64,...`) or bare base64 data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageShape {
    pub width: f64,
    pub height: f64,
    pub src: String,
    #[serde(default)]
    pub filter: ImageFilter,
}

impl ImageShape {
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            src: src.into(),
            filter: ImageFilter::None,
        }
    }

    /// Build a data-URL image from raw encoded bytes.
    pub fn from_bytes(data: &[u8], mime_type: &str, width: f64, height: f64) -> Self {
        let src = format!("data:{};base64,{}", mime_type, STANDARD.encode(data));
        Self::new(src, width, height)
    }

    pub fn with_filter(mut self, filter: ImageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// MIME type declared by a data URL, if any.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.src.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Get the raw image bytes (decoded from base64).
    pub fn data(&self) -> Option<Vec<u8>> {
        decode_data_url(&self.src)
    }
}

/// Decode the payload of a base64 data URL, or of bare base64 text.
pub fn decode_data_url(src: &str) -> Option<Vec<u8>> {
    let payload = match src.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest.split_once(',')?;
            if !header.ends_with(";base64") {
                return None;
            }
            body
        }
        None => src,
    };
    STANDARD.decode(payload.trim()).ok()
}
