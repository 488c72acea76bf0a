//! Settings for the pad
//!
//! Settings are read from a TOML file. Every field is optional in the file;
//! missing fields fall back to [`Settings::default`]. The lookup order is:
//!
//! 1. an explicit `--settings <path>`
//! 2. `./drumpad.toml`
//! 3. `<config_dir>/drumpad/drumpad.toml`
//!
//! ```toml
//! drum_margin = 1
//! sounds_dir = "sounds"
//! gain = 0.8
//! ```

use crate::error::{DrumpadError, DrumpadResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SETTINGS_FILE: &str = "drumpad.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gap between pad tiles, in terminal cells
    pub drum_margin: u16,
    /// Directory the kit's relative sample paths are resolved against
    pub sounds_dir: PathBuf,
    /// Master output gain (0.0 - 1.0)
    pub gain: f32,
    /// Where the interactive pad writes its log
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            drum_margin: 1,
            sounds_dir: PathBuf::from("sounds"),
            gain: 0.8,
            log_file: std::env::temp_dir().join("drumpad.log"),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn parse(content: &str, origin: &Path) -> DrumpadResult<Self> {
        let mut settings: Settings =
            toml::from_str(content).map_err(|e| DrumpadError::Settings {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        settings.gain = if settings.gain.is_finite() {
            settings.gain.clamp(0.0, 1.0)
        } else {
            Self::default().gain
        };
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> DrumpadResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::parse(&content, path)?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Resolve settings using the lookup order, defaulting when no file exists.
    /// An explicit path that is missing is an error; the implicit ones are not.
    pub fn discover(explicit: Option<&Path>) -> DrumpadResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        for candidate in Self::search_paths() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        debug!("No settings file found, using defaults");
        Ok(Self::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE)];
        if let Some(config) = dirs::config_dir() {
            paths.push(config.join("drumpad").join(SETTINGS_FILE));
        }
        paths
    }

    /// Render as TOML (for `drumpad config`)
    pub fn to_toml(&self) -> DrumpadResult<String> {
        toml::to_string_pretty(self).map_err(|e| DrumpadError::Settings {
            path: PathBuf::from(SETTINGS_FILE),
            message: e.to_string(),
        })
    }
}
