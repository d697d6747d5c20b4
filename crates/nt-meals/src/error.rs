// error.rs: Error types for the meal record store.

use nt_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during meal record operations.
///
/// A record id that is no longer present is not an error: resolve, fail
/// and delete report it through their return value instead.
#[derive(Debug, Error)]
pub enum MealError {
    /// The description was empty after trimming.
    #[error("meal description must not be empty")]
    EmptyDescription,

    /// Invalid state transition (records settle exactly once).
    #[error("invalid transition from {from} to {to} for meal {record_id}")]
    InvalidTransition {
        record_id: Uuid,
        from: String,
        to: String,
    },

    /// The mutation was applied in memory but the durable write failed.
    #[error("meal store not persisted after change to {record_id}: {source}")]
    NotPersisted {
        record_id: Uuid,
        source: StorageError,
    },

    /// Failed to serialize/deserialize meal data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A file I/O operation failed (journal observer).
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },
}
