// error.rs: Error types for target calculation and preference persistence.

use nt_storage::StorageError;
use thiserror::Error;

/// Errors that can occur while validating profiles or persisting preferences.
#[derive(Debug, Error)]
pub enum GoalsError {
    /// A profile field is out of range or not a finite number.
    #[error("invalid profile: {field} {reason}")]
    InvalidProfile { field: &'static str, reason: String },

    /// A string did not name a known enum value (sex, activity level, goal).
    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },

    /// Failed to serialize the preferences blob.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The durable slot could not be written. In-memory preferences are already updated.
    #[error("preferences not persisted: {0}")]
    Storage(#[from] StorageError),
}
