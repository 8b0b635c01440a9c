//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::draw::Style;
use crate::history::{DEFAULT_CAPACITY, DEFAULT_THROTTLE, HistorySettings};
use crate::input::DrawSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Undo/redo history settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Maximum entries kept on each of the undo and redo stacks (valid range: 1 - 1000)
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Mutations closer together than this many milliseconds become one undo step
    /// (valid range: 10 - 2000)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            throttle_ms: default_throttle_ms(),
        }
    }
}

impl HistoryConfig {
    pub fn settings(&self) -> HistorySettings {
        HistorySettings {
            capacity: self.capacity,
            throttle: Duration::from_millis(self.throttle_ms),
        }
    }
}

/// Drawing-related settings.
///
/// Controls the style of newly drawn shapes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DrawingConfig {
    /// Outline color - either a named color (red, green, blue, yellow, orange, pink, white, black)
    /// or an RGB array like `[255, 0, 0]` for red
    #[serde(default = "default_stroke_color")]
    pub stroke_color: ColorSpec,

    /// Outline width in canvas units (valid range: 0.5 - 50.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,

    /// Interior color for rectangles, ellipses and diamonds; unset leaves them hollow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<ColorSpec>,

    /// Shape opacity (valid range: 0.0 - 1.0)
    #[serde(default = "default_opacity")]
    pub opacity: f64,

    /// Smallest width/height of a finished shape, applied when a shape is
    /// placed without dragging (valid range: 0.0 - 100.0)
    #[serde(default = "default_min_shape_size")]
    pub min_shape_size: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            fill_color: None,
            opacity: default_opacity(),
            min_shape_size: default_min_shape_size(),
        }
    }
}

impl DrawingConfig {
    pub fn settings(&self) -> DrawSettings {
        DrawSettings {
            style: Style {
                stroke: self.stroke_color.to_color(),
                stroke_width: self.stroke_width,
                fill: self.fill_color.as_ref().map(ColorSpec::to_color),
                opacity: self.opacity,
            },
            min_shape_size: self.min_shape_size,
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE.as_millis() as u64
}

fn default_stroke_color() -> ColorSpec {
    ColorSpec::Name("black".to_string())
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_min_shape_size() -> f64 {
    1.0
}
