use std::path::Path;

use egui::Color32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_MAX_HISTORY;
use crate::style::ToolStyle;

/// Errors that can occur while loading the editor configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Zoom bounds and steps of the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Factor per wheel notch
    pub wheel_step: f32,
    /// Factor per click of the zoom tool
    pub click_step: f32,
    /// Manhattan distance in view pixels under which a zoom-tool release counts as a click
    pub click_tolerance: f32,
    /// Horizontal view pixels for a zoom-tool drag to double the zoom
    pub drag_divisor: f32,
    /// Extra scene space in view pixels around the image at high zoom
    pub scene_margin: f32,
    /// Zoom level from which the scene margin applies
    pub margin_threshold: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.0025,
            max_zoom: 200.0,
            wheel_step: 1.15,
            click_step: 1.2,
            click_tolerance: 5.0,
            drag_divisor: 100.0,
            scene_margin: 800.0,
            margin_threshold: 5.0,
        }
    }
}

/// Size and color of images created with "New"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewImageSettings {
    pub width: u32,
    pub height: u32,
    pub color: Color32,
}

impl Default for NewImageSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            color: Color32::WHITE,
        }
    }
}

/// Settings of the editing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_history_size: usize,
    pub zoom: ZoomSettings,
    /// Style the toolbar starts with
    pub style: ToolStyle,
    pub new_image: NewImageSettings,
    /// Default filter for `env_logger` when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history_size: DEFAULT_MAX_HISTORY,
            zoom: ZoomSettings::default(),
            style: ToolStyle::default(),
            new_image: NewImageSettings::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::info!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_owned(),
            })
        };
        if self.max_history_size == 0 {
            return invalid("max_history_size", "must keep at least one snapshot");
        }
        let zoom = &self.zoom;
        if !(zoom.min_zoom > 0.0 && zoom.min_zoom <= 1.0 && zoom.max_zoom >= 1.0) {
            return invalid("zoom", "bounds must satisfy 0 < min_zoom <= 1 <= max_zoom");
        }
        if zoom.wheel_step <= 1.0 || zoom.click_step <= 1.0 {
            return invalid("zoom", "steps must be greater than 1");
        }
        if zoom.drag_divisor <= 0.0 || zoom.click_tolerance < 0.0 {
            return invalid("zoom", "drag divisor must be positive and tolerance non-negative");
        }
        if self.new_image.width == 0 || self.new_image.height == 0 {
            return invalid("new_image", "size must be non-zero");
        }
        if !(0.0..=1.0).contains(&self.style.brush_opacity) {
            return invalid("style.brush_opacity", "must be within 0..=1");
        }
        Ok(())
    }
}
