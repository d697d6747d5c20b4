//! # nt-meals
//!
//! Meal record store for NutriTrack.
//!
//! A [`MealRecord`] is created `pending` the moment the user describes a
//! meal, then settles exactly once: `complete` when the analysis provider
//! returns a nutrient payload, `failed` when it rejects. The
//! [`RecordStore`] owns the collection, mirrors it to a durable slot after
//! every mutation, and then notifies every subscribed observer.
//!
//! ## Key components
//!
//! - [`MealRecord`], [`MealStatus`]: the record and its state machine
//!   (Pending → Complete | Failed)
//! - [`RecordStore`]: create / resolve / fail / delete / list / subscribe
//! - [`MealEvent`], [`RecordObserver`]: change notifications
//! - [`JournalObserver`]: appends events to a JSONL file
//! - [`format_history`]: digest of recent complete meals for the chat provider
//! - [`DailyTotals`]: per-day intake summed from complete records

pub mod error;
pub mod events;
pub mod history;
pub mod record;
pub mod store;
pub mod summary;

pub use error::MealError;
pub use events::{JournalObserver, MealEvent, RecordObserver, SubscriptionId};
pub use history::{format_history, NO_MEAL_HISTORY};
pub use record::{MealRecord, MealStatus, NutrientPayload};
pub use store::{RecordStore, MEAL_STORE_KEY};
pub use summary::{DailyTotals, NutrientProgress};
