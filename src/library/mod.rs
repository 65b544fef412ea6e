//! Catalog of recordings on disk.
//!
//! Listing filters by extension only and keeps whatever order the directory
//! listing returns; callers must not rely on it. `append` adds the entry a
//! just-finished capture produced without rescanning the directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::audio::format::RECORDING_EXTENSION;

pub struct RecordingLibrary {
    dir: PathBuf,
    entries: Mutex<Vec<String>>,
}

impl RecordingLibrary {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).context("Failed to create recordings directory")?;
        let library = Self {
            dir,
            entries: Mutex::new(Vec::new()),
        };
        library.refresh()?;
        Ok(library)
    }

    /// Re-scan the directory for recording files.
    pub fn refresh(&self) -> Result<()> {
        let mut found = Vec::new();
        for entry in std::fs::read_dir(&self.dir).context("Failed to read recordings directory")? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORDING_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    found.push(name.to_string());
                }
            }
        }
        debug!("Catalog holds {} recordings in {:?}", found.len(), self.dir);
        *self.entries.lock().unwrap() = found;
        Ok(())
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Add one entry without touching the filesystem.
    pub fn append(&self, name: impl Into<String>) {
        let name = name.into();
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains(&name) {
            entries.push(name);
        }
    }

    /// Full path for a catalog entry; existence is checked by the callers
    /// that care (play, transcribe).
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
