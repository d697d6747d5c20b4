//! # nt-goals
//!
//! Deterministic daily nutrient targets for NutriTrack.
//!
//! The [`engine`] turns a biometric [`Profile`] and a [`GoalSet`] into
//! [`NutrientTargets`]: Mifflin-St Jeor BMR, an activity multiplier, a closed
//! goal-combination table for the calorie adjustment and macro split, and
//! age/sex reference intakes for five micronutrients. It is a pure function:
//! no I/O, no shared state, same answer for the same input.
//!
//! ## Key components
//!
//! - [`compute_targets`]: the engine entry point
//! - [`compute_plan`]: same computation, keeping BMR/TDEE and the chosen rule
//! - [`Profile`], [`Sex`], [`ActivityLevel`]: engine input
//! - [`HealthGoal`], [`GoalSet`]: the closed goal vocabulary
//! - [`UserPreferences`], [`PreferencesStore`]: persisted user settings

pub mod engine;
pub mod error;
pub mod goal;
pub mod preferences;
pub mod profile;
pub mod targets;

pub use engine::{
    checked_targets, compute_plan, compute_targets, AdjustmentRule, GoalAdjustment, MacroSplit,
    TargetPlan,
};
pub use error::GoalsError;
pub use goal::{GoalSet, HealthGoal};
pub use preferences::{LearnedPreferences, PreferencesStore, UserPreferences, PREFERENCES_KEY};
pub use profile::{ActivityLevel, Profile, Sex};
pub use targets::NutrientTargets;
