//! Editor configuration, loaded once at startup from RON.
//!
//! ```ron
//! (
//!     mode: BackgroundFit,
//!     grid: (size: 64.0, orientation: PointyTop),
//!     camera: (zoom_step: 1.25),
//!     default_defense: 10,
//! )
//! ```
//!
//! Every field is optional and falls back to [`EditorConfig::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::camera::CameraSettings;
use crate::combat::DEFAULT_DEFENSE;
use crate::error::Result;
use crate::hex::{HexGrid, HexOrientation};
use crate::map_state::{MapState, DEFAULT_BACKGROUND_COLOR, DEFAULT_GRID_COLOR, DEFAULT_GRID_SIZE};

/// How clicks on the canvas place assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AppMode {
    /// Place immediately at the clicked hex.
    #[default]
    Standard,
    /// Ask for a size before placing; the background fills the canvas.
    BackgroundFit,
}

/// Grid settings applied to new maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDefaults {
    /// Hex outer radius in world pixels.
    pub size: f64,
    /// Cell orientation.
    pub orientation: HexOrientation,
    /// Grid line color.
    pub color: String,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            orientation: HexOrientation::FlatTop,
            color: DEFAULT_GRID_COLOR.to_string(),
        }
    }
}

/// Editor-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Panel background color.
    pub ui_bg_color: String,
    /// Panel text color.
    pub ui_fg_color: String,
    /// Token packs directory.
    pub tokens_directory: Option<String>,
    /// Marker icons directory.
    pub markers_directory: Option<String>,
    /// Placement mode.
    pub mode: AppMode,
    /// Grid settings for new maps.
    pub grid: GridDefaults,
    /// Zoom behavior.
    pub camera: CameraSettings,
    /// Eraser radius in screen pixels.
    pub erase_radius: f64,
    /// Paint color for new strokes.
    pub paint_color: String,
    /// Delay before the next round starts once everyone has acted.
    pub advance_delay_ms: u64,
    /// Defense used when a target has no score.
    pub default_defense: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            ui_bg_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            ui_fg_color: DEFAULT_GRID_COLOR.to_string(),
            tokens_directory: None,
            markers_directory: None,
            mode: AppMode::Standard,
            grid: GridDefaults::default(),
            camera: CameraSettings::default(),
            erase_radius: 20.0,
            paint_color: "white".to_string(),
            advance_delay_ms: 100,
            default_defense: DEFAULT_DEFENSE,
        }
    }
}

impl EditorConfig {
    /// Parse a config from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MapError::Config`] if the text is not valid RON for
    /// this type.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Load a config file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        info!(path = %path.display(), mode = ?config.mode, "config loaded");
        Ok(config)
    }

    /// Pretty-printed RON.
    ///
    /// # Errors
    ///
    /// Fails if serialization fails.
    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Write the config as pretty RON.
    ///
    /// # Errors
    ///
    /// Fails if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Grid geometry for a map drawn under this config.
    #[must_use]
    pub fn grid_for(&self, map: &MapState) -> HexGrid {
        map.grid(self.grid.orientation)
    }

    /// Empty map carrying this config's grid and theme settings.
    #[must_use]
    pub fn new_map(&self) -> MapState {
        MapState {
            grid_size: self.grid.size,
            grid_color: self.grid.color.clone(),
            ui_bg_color: self.ui_bg_color.clone(),
            ui_fg_color: self.ui_fg_color.clone(),
            tokens_directory: self.tokens_directory.clone(),
            markers_directory: self.markers_directory.clone(),
            ..MapState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.mode, AppMode::Standard);
        assert!((config.grid.size - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.grid.color, "#39ff14");
        assert!((config.erase_radius - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.advance_delay_ms, 100);
        assert_eq!(config.default_defense, 8);
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = EditorConfig::from_ron_str(
            "(mode: BackgroundFit, grid: (orientation: PointyTop), camera: (zoom_step: 1.25))",
        )
        .expect("valid config");
        assert_eq!(config.mode, AppMode::BackgroundFit);
        assert_eq!(config.grid.orientation, HexOrientation::PointyTop);
        assert!((config.grid.size - 50.0).abs() < f64::EPSILON);
        assert!((config.camera.zoom_step - 1.25).abs() < f64::EPSILON);
        assert!((config.camera.max_zoom - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_ron() {
        assert!(EditorConfig::from_ron_str("(mode: Sideways)").is_err());
    }

    #[test]
    fn test_ron_text_round_trip() {
        let mut config = EditorConfig::default();
        config.tokens_directory = Some("packs".into());
        config.default_defense = 11;
        let text = config.to_ron_string().expect("serializes");
        assert_eq!(EditorConfig::from_ron_str(&text).expect("parses"), config);
    }

    #[test]
    fn test_new_map_uses_grid_defaults() {
        let mut config = EditorConfig::default();
        config.grid.size = 64.0;
        config.markers_directory = Some("markers".into());
        let map = config.new_map();
        assert!((map.grid_size - 64.0).abs() < f64::EPSILON);
        assert_eq!(map.markers_directory.as_deref(), Some("markers"));
        assert!(map.is_empty());
    }
}
