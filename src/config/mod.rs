//! Configuration file support for inkboard.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/inkboard/config.toml`. Settings cover the undo history, the
//! style of new shapes, and keybindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{DrawingConfig, HistoryConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [history]
/// capacity = 50
/// throttle_ms = 100
///
/// [drawing]
/// stroke_color = "red"
/// stroke_width = 3.0
/// fill_color = [255, 255, 0]
///
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Y", "Ctrl+Shift+Z"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Undo/redo history limits and capture window
    #[serde(default)]
    pub history: HistoryConfig,

    /// Style of newly drawn shapes
    #[serde(default)]
    pub drawing: DrawingConfig,

    /// Keyboard shortcuts
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `history.capacity`: 1 - 1000
    /// - `history.throttle_ms`: 10 - 2000
    /// - `drawing.stroke_width`: 0.5 - 50.0
    /// - `drawing.opacity`: 0.0 - 1.0
    /// - `drawing.min_shape_size`: 0.0 - 100.0
    pub fn validate_and_clamp(&mut self) {
        // Capacity: 1 - 1000
        if !(1..=1000).contains(&self.history.capacity) {
            warn!(
                "Invalid history capacity {}, clamping to 1-1000 range",
                self.history.capacity
            );
            self.history.capacity = self.history.capacity.clamp(1, 1000);
        }

        // Throttle window: 10 - 2000 ms
        if !(10..=2000).contains(&self.history.throttle_ms) {
            warn!(
                "Invalid throttle_ms {}, clamping to 10-2000 range",
                self.history.throttle_ms
            );
            self.history.throttle_ms = self.history.throttle_ms.clamp(10, 2000);
        }

        // Stroke width: 0.5 - 50.0
        if !(0.5..=50.0).contains(&self.drawing.stroke_width) {
            warn!(
                "Invalid stroke_width {:.1}, clamping to 0.5-50.0 range",
                self.drawing.stroke_width
            );
            self.drawing.stroke_width = clamp_finite(self.drawing.stroke_width, 0.5, 50.0);
        }

        // Opacity: 0.0 - 1.0
        if !(0.0..=1.0).contains(&self.drawing.opacity) {
            warn!(
                "Invalid opacity {:.2}, clamping to 0.0-1.0 range",
                self.drawing.opacity
            );
            self.drawing.opacity = clamp_finite(self.drawing.opacity, 0.0, 1.0);
        }

        // Minimum shape size: 0.0 - 100.0
        if !(0.0..=100.0).contains(&self.drawing.min_shape_size) {
            warn!(
                "Invalid min_shape_size {:.1}, clamping to 0.0-100.0 range",
                self.drawing.min_shape_size
            );
            self.drawing.min_shape_size = clamp_finite(self.drawing.min_shape_size, 0.0, 100.0);
        }

        // Fall back to default keybindings rather than running with a broken map
        if let Err(err) = self.keybindings.build_action_map() {
            warn!("Invalid keybindings ({}), using defaults", err);
            self.keybindings = KeybindingsConfig::default();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/inkboard/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("inkboard");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read or parsed
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to the default config path.
    ///
    /// Creates the parent directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the config cannot be
    /// serialized, or the file cannot be written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Serializes the configuration as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// JSON schema describing the config file, for editor tooling.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}
