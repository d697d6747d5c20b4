// slot.rs: The DurableSlot trait and the in-memory backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;

/// A string-keyed read/write surface for serialized blobs.
///
/// Implementations make no claims about the blob format. Writes replace the
/// whole value for a key; there is no partial update.
pub trait DurableSlot: Send {
    /// Read the blob stored under `key`. `Ok(None)` means nothing was ever written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the blob stored under `key`. Returns whether anything was removed.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
}

impl<S: DurableSlot + ?Sized> DurableSlot for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        (**self).remove(key)
    }
}

/// In-process slot map.
///
/// Clones share the same underlying map, so a store can be dropped and a
/// new one opened over a clone to simulate a reload.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the raw blob under `key`, bypassing the trait.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Seed a raw blob, e.g. to simulate a corrupt slot.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written String.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl DurableSlot for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        Ok(self.lock().remove(key).is_some())
    }
}
