//! Sound clips, one per mode, resolved on first use and kept.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::error::NotifyError;
use crate::mode::Mode;

pub const CLIP_EXTENSION: &str = "mp3";

#[derive(Debug)]
pub struct AudioClip {
    pub mode: Mode,
    pub path: PathBuf,
    bytes: OnceLock<Arc<[u8]>>,
}

impl AudioClip {
    pub fn new(mode: Mode, path: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            path: path.into(),
            bytes: OnceLock::new(),
        }
    }

    /// File contents, read the first time they are asked for.
    ///
    /// This reads from disk, so only call it off the event loop.
    pub fn bytes(&self) -> Result<Arc<[u8]>, NotifyError> {
        if let Some(bytes) = self.bytes.get() {
            return Ok(Arc::clone(bytes));
        }
        let read: Arc<[u8]> = fs::read(&self.path)
            .map_err(|source| NotifyError::ReadClip {
                path: self.path.clone(),
                source,
            })?
            .into();
        debug!(path = ?self.path, len = read.len(), "Loaded sound clip");
        Ok(Arc::clone(self.bytes.get_or_init(|| read)))
    }
}

/// Resolves `<dir>/<mode>.mp3` the first time a mode is asked for and keeps
/// the clip, contents included once a player has read them.
#[derive(Debug)]
pub struct ClipCache {
    dir: PathBuf,
    clips: HashMap<Mode, Arc<AudioClip>>,
}

impl ClipCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            clips: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, mode: Mode) -> PathBuf {
        self.dir.join(mode.key()).with_extension(CLIP_EXTENSION)
    }

    pub fn get(&mut self, mode: Mode) -> Result<Arc<AudioClip>, NotifyError> {
        if let Some(clip) = self.clips.get(&mode) {
            return Ok(Arc::clone(clip));
        }
        let path = self.path_for(mode);
        if !path.is_file() {
            return Err(NotifyError::MissingClip(path));
        }
        let clip = Arc::new(AudioClip::new(mode, path));
        self.clips.insert(mode, Arc::clone(&clip));
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_once_and_reads_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shortBreak.mp3");
        fs::write(&path, b"ID3first").unwrap();

        let mut cache = ClipCache::new(dir.path());
        let first = cache.get(Mode::ShortBreak).unwrap();
        assert_eq!(&*first.bytes().unwrap(), b"ID3first");

        // Later edits on disk are not picked up: the clip is cached.
        fs::write(&path, b"ID3second").unwrap();
        let second = cache.get(Mode::ShortBreak).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*second.bytes().unwrap(), b"ID3first");
    }

    #[test]
    fn missing_clip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ClipCache::new(dir.path());
        let err = cache.get(Mode::LongBreak).unwrap_err();
        assert!(matches!(err, NotifyError::MissingClip(p) if p.ends_with("longBreak.mp3")));

        // A clip added later is found on the next attempt.
        fs::write(dir.path().join("longBreak.mp3"), b"ID3").unwrap();
        assert!(cache.get(Mode::LongBreak).is_ok());
    }

    #[test]
    fn unreadable_clip_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let clip = AudioClip::new(Mode::Focus, dir.path().join("gone.mp3"));
        assert!(matches!(clip.bytes(), Err(NotifyError::ReadClip { .. })));
    }
}
