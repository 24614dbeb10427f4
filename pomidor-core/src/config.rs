//! Optional `pomidor.toml` with notification and logging preferences.
//!
//! ```toml
//! [notifications]
//! locale = "fr-FR"
//! speech = true
//! speech_program = "espeak-ng"
//! audio_program = "mpg123"
//! sounds_dir = "/usr/share/pomidor/sounds"
//! desktop = false
//!
//! [logging]
//! level = "info,pomidor_core=debug"
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    /// Overrides the detected system locale.
    pub locale: Option<String>,
    /// Off means audio clips only.
    pub speech: bool,
    pub speech_program: Option<String>,
    pub audio_program: Option<String>,
    pub sounds_dir: Option<PathBuf>,
    /// Also show a desktop banner on phase completion.
    pub desktop: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            locale: None,
            speech: true,
            speech_program: None,
            audio_program: None,
            sounds_dir: None,
            desktop: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl NotificationConfig {
    pub fn sounds_dir(&self) -> PathBuf {
        self.sounds_dir
            .clone()
            .or_else(paths::default_sounds_dir)
            .unwrap_or_else(|| PathBuf::from("sounds"))
    }
}

impl Config {
    pub fn from_toml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw, path)
    }
}

/// Reads the config file from the platform config dir, defaults if absent.
pub fn load_config() -> Result<Config, ConfigError> {
    match paths::config_file() {
        Some(path) => Config::load_from(&path),
        None => Ok(Config::default()),
    }
}
