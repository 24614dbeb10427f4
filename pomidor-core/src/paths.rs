use directories::ProjectDirs;
use std::path::PathBuf;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pomidor", "pomidor")
}

/// Directory for the settings document, logs and bundled sounds.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("pomidor.toml"))
}

pub fn settings_file() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.json"))
}

pub fn log_file() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("pomidor.log"))
}

pub fn default_sounds_dir() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("sounds"))
}
