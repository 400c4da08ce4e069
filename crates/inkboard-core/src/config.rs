//! Engine configuration.

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::outline::DEFAULT_THINNING;
use crate::selection::HANDLE_SIZE;
use crate::shapes::{DEFAULT_STROKE_WIDTH, SerializableColor};
use crate::snap::SNAP_TOLERANCE_PX;
use crate::viewport::{MAX_SCALE, MIN_SCALE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Tunables for the canvas engine and renderer.
///
/// Pixel-denominated values are divided by the viewport scale at use so they
/// stay constant on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of undo snapshots.
    pub history_capacity: usize,
    /// Snap distance in surface pixels.
    pub snap_tolerance_px: f64,
    /// Resize handle edge length in surface pixels.
    pub handle_size: f64,
    /// Gap between a selected shape and its dashed outline, in canvas units.
    pub selection_padding: f64,
    /// Opacity removed from an entity when the eraser first touches it.
    pub eraser_opacity_step: f64,
    /// World-space distance between grid lines.
    pub grid_spacing: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Stroke color for new shapes and paths.
    pub default_stroke: SerializableColor,
    pub default_stroke_width: f64,
    /// Thinning applied when outlining ink paths.
    pub path_thinning: f64,
    /// Outline size relative to a path's stored stroke width.
    pub path_width_multiplier: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            snap_tolerance_px: SNAP_TOLERANCE_PX,
            handle_size: HANDLE_SIZE,
            selection_padding: 4.0,
            eraser_opacity_step: 0.5,
            grid_spacing: 20.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            default_stroke: SerializableColor::black(),
            default_stroke_width: DEFAULT_STROKE_WIDTH,
            path_thinning: DEFAULT_THINNING,
            path_width_multiplier: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded engine config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("historyCapacity must be at least 1".into()));
        }
        if !(MIN_SCALE <= self.min_scale && self.min_scale <= self.max_scale && self.max_scale <= MAX_SCALE) {
            return Err(ConfigError::Invalid(format!(
                "scale bounds [{}, {}] must lie within [{MIN_SCALE}, {MAX_SCALE}]",
                self.min_scale, self.max_scale
            )));
        }
        for (name, value) in [
            ("snapTolerancePx", self.snap_tolerance_px),
            ("handleSize", self.handle_size),
            ("selectionPadding", self.selection_padding),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must not be negative")));
            }
        }
        if !(0.0..=1.0).contains(&self.eraser_opacity_step) {
            return Err(ConfigError::Invalid("eraserOpacityStep must be within [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.path_thinning) {
            return Err(ConfigError::Invalid("pathThinning must be within [0, 1]".into()));
        }
        if self.grid_spacing <= 0.0 {
            return Err(ConfigError::Invalid("gridSpacing must be positive".into()));
        }
        Ok(())
    }
}
