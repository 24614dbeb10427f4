//! Persistence port for [`Settings`].

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::settings::Settings;

pub trait SettingsStore {
    /// Saved settings, or defaults when nothing usable is stored.
    fn load(&self) -> Settings;

    fn save(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// One JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Settings {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Settings::from_json(&raw),
            Err(e) => {
                debug!(path = ?self.path, error = %e, "No saved settings, using defaults");
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = settings.to_json()?;
        // Readers only ever see a complete document.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

/// Keeps the document in memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `raw` as the stored document, parseable or not.
    pub fn with_document(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Settings {
        match self.raw.borrow().as_deref() {
            Some(raw) => Settings::from_json(raw),
            None => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        *self.raw.borrow_mut() = Some(settings.to_json()?);
        Ok(())
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn load(&self) -> Settings {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        (**self).save(settings)
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Rc<S> {
    fn load(&self) -> Settings {
        (**self).load()
    }

    fn save(&self, settings: &Settings) -> Result<(), StoreError> {
        (**self).save(settings)
    }
}

/// Saves and logs instead of failing. The timer keeps working either way.
pub(crate) fn save_or_warn(store: &dyn SettingsStore, settings: &Settings) {
    if let Err(e) = store.save(settings) {
        warn!(error = %e, "Failed to save settings");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("settings.json"));
        assert_eq!(store.load(), Settings::default());

        let mut settings = Settings::default();
        settings.auto_cycle_enabled = true;
        settings.selected_color = "#70f3f8".into();
        store.save(&settings).unwrap();

        assert_eq!(store.load(), settings);
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "\u{0}\u{0}garbage").unwrap();
        assert_eq!(JsonFileStore::new(path).load(), Settings::default());
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let store = MemoryStore::with_document("[]");
        assert_eq!(store.load(), Settings::default());

        let mut settings = Settings::default();
        settings.sound_enabled = false;
        store.save(&settings).unwrap();
        assert!(!store.load().sound_enabled);
        assert!(store.document().unwrap().contains("\"soundEnabled\": false"));
    }
}
