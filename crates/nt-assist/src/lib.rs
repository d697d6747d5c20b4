//! # nt-assist
//!
//! Async workflows around the two external NutriTrack collaborators: the
//! meal analysis provider and the diet chat provider.
//!
//! The stores in `nt-meals` and `nt-goals` are synchronous. This crate
//! shares them behind `Arc<Mutex<_>>` and makes sure no lock is held while a
//! provider call is awaited, so meals logged back to back settle
//! independently and in any order.
//!
//! ## Key components
//!
//! - [`MealAnalyzer`], [`DietChat`]: provider seams (`async_trait`)
//! - [`MealLogger`]: create pending, analyze, then resolve or fail
//! - [`Settlement`]: outcome of one logged meal
//! - [`DietAssistant`]: chat with history digest and learned preferences

pub mod assistant;
pub mod error;
pub mod logger;
pub mod provider;

pub use assistant::{
    shared_preferences, AssistantReply, DietAssistant, SharedPreferences,
    DEFAULT_HISTORY_WINDOW_DAYS, WELCOME_MESSAGE,
};
pub use error::AssistError;
pub use logger::{shared_store, MealLogger, Settlement, SharedStore};
pub use provider::{ChatReply, DietChat, MealAnalyzer};
