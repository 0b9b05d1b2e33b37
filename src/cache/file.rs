//! File-based cache store with atomic writes.
//!
//! One `<location>.json` file per `(day, key)` pair under a cache root.
//! Reads fail soft: a missing file is a miss, an undecodable file is
//! deleted and reported as a miss.

use crate::cache::format::CacheEntry;
use crate::cache::location::CacheLocation;
use crate::cache::observer::{CacheEvent, CacheObserver, TracingObserver};
use crate::KeywardError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// File-based cache store.
pub struct FileCache {
    /// Directory for cache files.
    cache_dir: PathBuf,
    observer: Arc<dyn CacheObserver>,
}

impl FileCache {
    /// Create a file cache under `dirs::data_dir()/<namespace>/`.
    pub fn new(namespace: &str) -> Result<Self, KeywardError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| KeywardError::StoreError("Could not find data directory".to_string()))?;

        Self::with_path(base_dir.join(namespace))
    }

    /// Create a file cache rooted at `cache_dir`.
    pub fn with_path(cache_dir: PathBuf) -> Result<Self, KeywardError> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| KeywardError::StoreError(format!("Failed to create cache dir: {}", e)))?;
        Ok(Self {
            cache_dir,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Replace the event observer.
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Cache root directory.
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the entry file for a location.
    pub fn entry_path(&self, location: &CacheLocation) -> PathBuf {
        self.cache_dir.join(format!("{}.json", location))
    }

    /// Load the entry at `location`.
    ///
    /// Absent and corrupt entries both yield `Ok(None)`; corrupt ones are
    /// removed first. Only other I/O failures are errors.
    pub fn get(&self, location: &CacheLocation) -> Result<Option<CacheEntry>, KeywardError> {
        let path = self.entry_path(location);

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.observer.record(CacheEvent::Miss, location);
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                // Not UTF-8: same treatment as undecodable JSON.
                self.discard_corrupt(location, &e.to_string())?;
                return Ok(None);
            }
            Err(e) => {
                return Err(KeywardError::StoreError(format!(
                    "Failed to read cache file: {}",
                    e
                )))
            }
        };

        match CacheEntry::from_json(&json) {
            Ok(entry) => {
                self.observer.record(CacheEvent::Hit, location);
                Ok(Some(entry))
            }
            Err(e) => {
                self.discard_corrupt(location, &e.to_string())?;
                Ok(None)
            }
        }
    }

    /// Write `entry` at `location`, replacing any previous entry.
    ///
    /// Each write goes through its own temp file and is persisted with a
    /// rename, so concurrent writers never see a partial entry.
    pub fn put(&self, location: &CacheLocation, entry: &CacheEntry) -> Result<(), KeywardError> {
        let target_path = self.entry_path(location);
        let json = entry.to_json()?;

        let temp = NamedTempFile::new_in(&self.cache_dir)
            .map_err(|e| KeywardError::StoreError(format!("Failed to create temp file: {}", e)))?;

        let mut file = temp.as_file();
        file.write_all(json.as_bytes())
            .map_err(|e| KeywardError::StoreError(format!("Failed to write temp file: {}", e)))?;
        file.sync_all()
            .map_err(|e| KeywardError::StoreError(format!("Failed to sync temp file: {}", e)))?;

        temp.persist(&target_path).map_err(|e| {
            KeywardError::StoreError(format!("Failed to rename cache file: {}", e.error))
        })?;

        self.observer.record(CacheEvent::Set, location);
        Ok(())
    }

    /// Remove an entry that failed verification.
    pub fn evict(&self, location: &CacheLocation) -> Result<(), KeywardError> {
        self.delete(location)?;
        self.observer.record(CacheEvent::Evicted, location);
        Ok(())
    }

    /// Delete the entry at `location`. Absent entries are not an error.
    pub fn delete(&self, location: &CacheLocation) -> Result<(), KeywardError> {
        match fs::remove_file(self.entry_path(location)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(KeywardError::StoreError(format!(
                "Failed to delete cache: {}",
                e
            ))),
        }
    }

    /// Remove every cache entry, including ones from past days.
    pub fn clear(&self) -> Result<(), KeywardError> {
        for entry in fs::read_dir(&self.cache_dir)
            .map_err(|e| KeywardError::StoreError(format!("Failed to read cache dir: {}", e)))?
        {
            let entry =
                entry.map_err(|e| KeywardError::StoreError(format!("Failed to read entry: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(&path)
                    .map_err(|e| KeywardError::StoreError(format!("Failed to delete: {}", e)))?;
            }
        }
        Ok(())
    }

    fn discard_corrupt(&self, location: &CacheLocation, reason: &str) -> Result<(), KeywardError> {
        tracing::warn!(%location, reason, "discarding unreadable cache entry");
        self.delete(location)?;
        self.observer.record(CacheEvent::Corrupt, location);
        Ok(())
    }
}
