// error.rs: Error types for durable slot access.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a durable slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The key cannot be mapped onto the backend (empty, or contains a path separator).
    #[error("invalid slot key: {0:?}")]
    InvalidKey(String),

    /// The backend refused the write (read-only or simulated failure).
    #[error("slot {key} is not writable: {reason}")]
    Unwritable { key: String, reason: String },
}
