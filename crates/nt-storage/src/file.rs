// file.rs: FileSlots, one JSON file per key under a data directory.
//
// Layout: `<data_dir>/<key>.json`. Writes go to `<key>.json.tmp` first and
// are renamed into place, so a crash mid-write leaves the previous blob intact.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::slot::DurableSlot;

/// File-backed slots rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    data_dir: PathBuf,
}

impl FileSlots {
    /// Create slots backed by the given directory.
    /// Creates the directory if it doesn't exist.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| StorageError::IoError {
            path: data_dir.clone(),
            source,
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the file for a given key.
    pub fn slot_file(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl DurableSlot for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_file(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let blob = fs::read_to_string(&path).map_err(|source| StorageError::IoError {
            path: path.clone(),
            source,
        })?;
        Ok(Some(blob))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_file(key)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|source| StorageError::IoError {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::IoError {
            path: path.clone(),
            source,
        })?;
        tracing::trace!(key, bytes = value.len(), "slot written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        let path = self.slot_file(key)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| StorageError::IoError {
            path: path.clone(),
            source,
        })?;
        Ok(true)
    }
}
