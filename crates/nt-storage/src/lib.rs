//! # nt-storage
//!
//! Durable key/value slots for NutriTrack.
//!
//! A slot holds one serialized blob per string key. The stores built on top
//! (meal records, user preferences) own their schema; this crate only moves
//! strings in and out of durable storage.
//!
//! ## Key components
//!
//! - [`DurableSlot`]: the get/set surface every backend implements
//! - [`FileSlots`]: one JSON file per key inside a data directory
//! - [`MemorySlots`]: shared in-process map, used for ephemeral stores and tests

pub mod error;
pub mod file;
pub mod slot;

pub use error::StorageError;
pub use file::FileSlots;
pub use slot::{DurableSlot, MemorySlots};
