//! Inkboard Render Library
//!
//! Renderer abstraction and implementations for Inkboard.
//! Frames are composed against the [`Surface`] trait; the default backend
//! uses Vello for GPU-accelerated rendering.

pub mod compose;
pub mod filters;
mod recording;
mod renderer;
mod surface;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use compose::compose;
pub use filters::ImageCache;
pub use recording::{DrawOp, RecordingSurface};
pub use renderer::{GridStyle, Palette, RenderContext, RenderResult, Renderer, RendererError};
pub use surface::{ImageSource, Surface, TextMetrics, TextStyle};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
