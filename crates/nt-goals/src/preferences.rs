// preferences.rs: User preferences and their durable slot.
//
// Preferences hold the optional biometric fields collected by the profile
// form, the selected health goals, dietary restrictions, and food likes and
// dislikes (some learned from chat). They are persisted as
// `{"preferences": {...}}` under the `nutritrack-user` key.

use nt_storage::DurableSlot;
use serde::{Deserialize, Serialize};

use crate::engine::compute_targets;
use crate::error::GoalsError;
use crate::goal::GoalSet;
use crate::profile::{ActivityLevel, Profile, Sex};
use crate::targets::NutrientTargets;

/// Slot key for the persisted preferences document.
pub const PREFERENCES_KEY: &str = "nutritrack-user";

/// Everything the user has told us about themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub dietary_restrictions: Vec<String>,
    pub health_goals: GoalSet,
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub activity_level: ActivityLevel,
}

/// Likes and dislikes picked up from a chat exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnedPreferences {
    pub likes: Vec<String>,
    pub dislikes: Vec<String>,
}

impl LearnedPreferences {
    pub fn is_empty(&self) -> bool {
        self.likes.is_empty() && self.dislikes.is_empty()
    }
}

impl UserPreferences {
    /// The biometric profile, if every field is present and valid.
    pub fn profile(&self) -> Option<Profile> {
        Profile::new(
            self.age?,
            self.sex?,
            self.height_cm?,
            self.weight_kg?,
            self.activity_level,
        )
        .ok()
    }

    /// Engine targets for the stored profile, or the fallback targets when
    /// the profile is incomplete.
    pub fn daily_targets(&self) -> NutrientTargets {
        match self.profile() {
            Some(profile) => compute_targets(&profile, &self.health_goals),
            None => NutrientTargets::fallback(),
        }
    }

    /// Union learned likes/dislikes into the existing lists.
    ///
    /// Entries are trimmed; blanks and case-insensitive duplicates are
    /// skipped. Existing order is preserved and new items are appended.
    /// Returns whether anything changed.
    pub fn merge_learned(&mut self, learned: &LearnedPreferences) -> bool {
        let added_likes = merge_unique(&mut self.likes, &learned.likes);
        let added_dislikes = merge_unique(&mut self.dislikes, &learned.dislikes);
        added_likes || added_dislikes
    }
}

fn merge_unique(existing: &mut Vec<String>, incoming: &[String]) -> bool {
    let mut changed = false;
    for item in incoming {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if existing.iter().any(|e| e.eq_ignore_ascii_case(item)) {
            continue;
        }
        existing.push(item.to_string());
        changed = true;
    }
    changed
}

#[derive(Serialize, Deserialize)]
struct PreferencesDocument {
    #[serde(default)]
    preferences: UserPreferences,
}

/// Preferences mirrored to a durable slot.
///
/// The in-memory copy is authoritative: a failed write still leaves the new
/// preferences in place and reports the storage error.
pub struct PreferencesStore {
    slot: Box<dyn DurableSlot>,
    preferences: UserPreferences,
}

impl PreferencesStore {
    /// Load preferences from the slot. A missing, unreadable or corrupt
    /// document yields default preferences.
    pub fn open(slot: Box<dyn DurableSlot>) -> Self {
        let preferences = match slot.read(PREFERENCES_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<PreferencesDocument>(&blob) {
                Ok(doc) => doc.preferences,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding corrupt preferences document");
                    UserPreferences::default()
                }
            },
            Ok(None) => UserPreferences::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read preferences; starting from defaults");
                UserPreferences::default()
            }
        };
        Self { slot, preferences }
    }

    pub fn get(&self) -> &UserPreferences {
        &self.preferences
    }

    /// Replace the preferences and persist them.
    pub fn save(&mut self, preferences: UserPreferences) -> Result<(), GoalsError> {
        self.preferences = preferences;
        self.persist()
    }

    /// Merge learned likes/dislikes; persists only when something changed.
    pub fn merge_learned(&mut self, learned: &LearnedPreferences) -> Result<bool, GoalsError> {
        if !self.preferences.merge_learned(learned) {
            return Ok(false);
        }
        tracing::debug!(
            likes = learned.likes.len(),
            dislikes = learned.dislikes.len(),
            "merged learned preferences"
        );
        self.persist()?;
        Ok(true)
    }

    fn persist(&mut self) -> Result<(), GoalsError> {
        let doc = PreferencesDocument {
            preferences: self.preferences.clone(),
        };
        let json = serde_json::to_string(&doc)?;
        self.slot.write(PREFERENCES_KEY, &json)?;
        Ok(())
    }
}
