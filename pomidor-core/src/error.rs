//! Error types for pomidor-core.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while writing the settings document.
///
/// Loading never fails: a missing or corrupt document yields defaults.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of a notification channel. None of these reach the user.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("speech output is not available")]
    SpeechUnavailable,

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sound clip not found at {0}")]
    MissingClip(PathBuf),

    #[error("failed to read sound clip {path}: {source}")]
    ReadClip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("audio playback failed: {0}")]
    Playback(String),

    #[error("speech engine error: {0}")]
    Tts(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
