//! Runtime configuration
//!
//! Stored as pretty RON. Every field has a default, so a partial file (or no
//! file at all) is valid.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use crate::editor::KeyBinding;
use crate::mesh::Palette;
use crate::world::SegmentTemplate;

/// Error type for config loading and saving
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Fixed viewing camera used by the binary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Distance from the tube mouth along +Z
    pub distance: f32,
    /// Vertical field of view in degrees
    pub fovy: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { distance: 1.5, fovy: 60.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// File used by the Save and Load commands
    pub level_path: PathBuf,
    /// Depth of one sector in render units
    pub z_scale: f32,
    /// Editor depth scroll per key press
    pub scroll_step: f32,
    /// Playing-mode depth advance per frame
    pub play_speed: f32,
    pub player_z_offset: f32,
    pub player_height: f32,
    /// Level created when nothing is loaded at startup
    pub blank_level: SegmentTemplate,
    pub palette: Palette,
    pub camera: CameraConfig,
    /// Applied on top of the default editor key map
    pub bindings: Vec<KeyBinding>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            level_path: PathBuf::from("level.dat"),
            z_scale: 0.04,
            scroll_step: 0.02,
            play_speed: 0.002,
            player_z_offset: -0.08,
            player_height: 0.4,
            blank_level: SegmentTemplate::default(),
            palette: Palette::default(),
            camera: CameraConfig::default(),
            bindings: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Default config file location, if the platform has a config directory
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tube-editor").join("config.ron"))
    }

    #[cfg(target_arch = "wasm32")]
    pub fn default_path() -> Option<PathBuf> {
        None
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .indentor("  ".to_string());

        let ron_string = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, ron_string)?;
        Ok(())
    }

    /// Load the config from an explicit path, or from the default location.
    ///
    /// An explicit path must load. The default location is seeded with the
    /// defaults when missing, and falls back to them when broken.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load(path)?;
            log::info!("Loaded config '{}'", path.display());
            return Ok(config);
        }

        match Self::default_path() {
            Some(path) => Ok(Self::load_or_create(&path)),
            None => {
                log::info!("No config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_or_create(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            let written = match path.parent() {
                Some(dir) => fs::create_dir_all(dir).map_err(ConfigError::from),
                None => Ok(()),
            }
            .and_then(|()| config.save(path));
            match written {
                Ok(()) => log::info!("Wrote default config to '{}'", path.display()),
                Err(e) => log::warn!("Could not write default config '{}': {}", path.display(), e),
            }
            return config;
        }

        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config '{}'", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config '{}': {}", path.display(), e);
                Self::default()
            }
        }
    }
}
