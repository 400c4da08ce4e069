//! Image decoding and CPU-side filters.

use crate::renderer::{RenderResult, RendererError};
use crate::surface::ImageSource;
use image::RgbaImage;
use inkboard_core::shapes::{EntityId, ImageFilter, decode_data_url};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Decode an image source and apply its filter.
///
/// Opacity is left to the backend so fades do not force a re-decode.
pub fn load_image(source: &ImageSource<'_>) -> RenderResult<RgbaImage> {
    let bytes = decode_data_url(source.src).ok_or(RendererError::NotDataUrl)?;
    let mut rgba = image::load_from_memory(&bytes)?.to_rgba8();
    apply_filter(&mut rgba, source.filter);
    Ok(rgba)
}

/// Apply a CSS-style filter at full strength.
pub fn apply_filter(image: &mut RgbaImage, filter: ImageFilter) {
    if filter == ImageFilter::None {
        return;
    }
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let (r, g, b) = (r as f64, g as f64, b as f64);
        let rgb = match filter {
            ImageFilter::None => [r, g, b],
            ImageFilter::Grayscale => {
                let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                [luma, luma, luma]
            }
            ImageFilter::Sepia => [
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
            ],
            ImageFilter::Invert => [255.0 - r, 255.0 - g, 255.0 - b],
        };
        pixel.0 = [channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), a];
    }
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn hash_src(src: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    src.hash(&mut hasher);
    hasher.finish()
}

struct CachedImage<T> {
    src_hash: u64,
    filter: ImageFilter,
    /// `None` when decoding failed.
    image: Option<T>,
}

/// Decoded images converted to a backend's native representation.
///
/// Holds one variant per shape: a new source or filter replaces the old
/// decode. Failed decodes are cached too, so a broken image warns once
/// rather than every frame.
pub struct ImageCache<T> {
    entries: HashMap<EntityId, CachedImage<T>>,
}

impl<T> Default for ImageCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> ImageCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached image for `source`, decoding and converting it when the shape
    /// is new or its source or filter changed.
    pub fn get_or_load(
        &mut self,
        source: &ImageSource<'_>,
        convert: impl FnOnce(RgbaImage) -> T,
    ) -> Option<&T> {
        let src_hash = hash_src(source.src);
        let stale = self
            .entries
            .get(&source.id)
            .is_none_or(|cached| cached.src_hash != src_hash || cached.filter != source.filter);
        if stale {
            let image = match load_image(source) {
                Ok(rgba) => Some(convert(rgba)),
                Err(e) => {
                    log::warn!("image {}: {}", source.id, e);
                    None
                }
            };
            self.entries.insert(
                source.id,
                CachedImage {
                    src_hash,
                    filter: source.filter,
                    image,
                },
            );
        }
        self.entries.get(&source.id).and_then(|cached| cached.image.as_ref())
    }

    /// Drop entries for shapes that `keep` rejects.
    pub fn retain(&mut self, mut keep: impl FnMut(EntityId) -> bool) {
        self.entries.retain(|id, _| keep(*id));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
