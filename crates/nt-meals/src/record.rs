// record.rs: MealRecord and its settlement state machine.
//
// A record is created Pending with a zeroed payload and settles once:
//   Pending → Complete (payload merged)
//   Pending → Failed
// Complete and Failed are terminal; deletion is handled by the store and
// is allowed from any state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MealError;

/// Settlement status of a meal record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MealStatus {
    /// Logged, waiting for the analysis provider.
    Pending,
    /// Analysis succeeded; the payload can be trusted.
    Complete,
    /// Analysis failed; the payload stays zeroed.
    Failed,
}

impl fmt::Display for MealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MealStatus::Pending => write!(f, "pending"),
            MealStatus::Complete => write!(f, "complete"),
            MealStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for MealStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(MealStatus::Pending),
            "complete" => Ok(MealStatus::Complete),
            "failed" => Ok(MealStatus::Failed),
            other => Err(format!("unknown meal status: {}", other)),
        }
    }
}

impl MealStatus {
    /// Only Pending records may settle, and never back to Pending.
    pub fn can_transition_to(&self, next: MealStatus) -> bool {
        matches!(
            (self, next),
            (MealStatus::Pending, MealStatus::Complete) | (MealStatus::Pending, MealStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MealStatus::Pending)
    }
}

/// Nutrition estimate returned by the analysis provider.
///
/// Macros are grams, calories kcal, micronutrients mg except vitamin D (mcg).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientPayload {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamin_d: Option<f64>,
}

impl NutrientPayload {
    /// Basic macro payload without micronutrients.
    pub fn macros(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
            ..Default::default()
        }
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Replace negative or non-finite estimates with zero.
    pub(crate) fn sanitized(mut self) -> Self {
        fn clean(v: f64) -> f64 {
            if v.is_finite() && v > 0.0 {
                v
            } else {
                0.0
            }
        }
        self.calories = clean(self.calories);
        self.protein = clean(self.protein);
        self.carbs = clean(self.carbs);
        self.fats = clean(self.fats);
        for micro in [
            &mut self.calcium,
            &mut self.iron,
            &mut self.potassium,
            &mut self.vitamin_c,
            &mut self.vitamin_d,
        ] {
            *micro = micro.map(clean);
        }
        self
    }
}

/// One logged meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    /// Unique, immutable identifier.
    pub id: Uuid,

    /// When the meal was logged. Immutable.
    pub date: DateTime<Utc>,

    /// The user's own description, as typed or transcribed. Immutable.
    pub description: String,

    pub status: MealStatus,

    /// Zeroed while pending; only trusted once complete.
    #[serde(flatten)]
    pub nutrients: NutrientPayload,
}

impl MealRecord {
    /// A new pending record dated now.
    pub fn pending(description: impl Into<String>) -> Self {
        Self::pending_at(description, Utc::now())
    }

    /// A new pending record with an explicit date.
    pub fn pending_at(description: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            status: MealStatus::Pending,
            nutrients: NutrientPayload::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == MealStatus::Complete
    }

    /// Settle as complete, taking the provider's payload.
    pub fn complete(&mut self, payload: NutrientPayload) -> Result<(), MealError> {
        self.transition(MealStatus::Complete)?;
        self.nutrients = payload.sanitized();
        Ok(())
    }

    /// Settle as failed. The payload stays zeroed.
    pub fn mark_failed(&mut self) -> Result<(), MealError> {
        self.transition(MealStatus::Failed)
    }

    fn transition(&mut self, next: MealStatus) -> Result<(), MealError> {
        if !self.status.can_transition_to(next) {
            return Err(MealError::InvalidTransition {
                record_id: self.id,
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending_and_zeroed() {
        let record = MealRecord::pending("oatmeal with blueberries");
        assert_eq!(record.status, MealStatus::Pending);
        assert_eq!(record.nutrients, NutrientPayload::default());
        assert!(record.nutrients.ingredients.is_empty());
        assert!(!record.is_complete());
    }

    #[test]
    fn ids_are_unique() {
        let a = MealRecord::pending("a");
        let b = MealRecord::pending("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn complete_merges_payload() {
        let mut record = MealRecord::pending("toast");
        let payload = NutrientPayload::macros(250.0, 8.0, 40.0, 6.0).with_ingredients(["bread"]);
        record.complete(payload.clone()).unwrap();
        assert_eq!(record.status, MealStatus::Complete);
        assert_eq!(record.nutrients, payload);
    }

    #[test]
    fn settled_records_reject_further_transitions() {
        let mut done = MealRecord::pending("soup");
        done.complete(NutrientPayload::macros(100.0, 5.0, 10.0, 2.0))
            .unwrap();
        assert!(matches!(
            done.mark_failed(),
            Err(MealError::InvalidTransition { .. })
        ));
        assert!(matches!(
            done.complete(NutrientPayload::default()),
            Err(MealError::InvalidTransition { .. })
        ));

        let mut failed = MealRecord::pending("mystery");
        failed.mark_failed().unwrap();
        assert!(failed.complete(NutrientPayload::default()).is_err());
        assert_eq!(failed.nutrients, NutrientPayload::default());
    }

    #[test]
    fn no_transition_back_to_pending() {
        for from in [MealStatus::Pending, MealStatus::Complete, MealStatus::Failed] {
            assert!(!from.can_transition_to(MealStatus::Pending));
        }
    }

    #[test]
    fn negative_estimates_are_zeroed() {
        let mut record = MealRecord::pending("odd");
        let mut payload = NutrientPayload::macros(-10.0, f64::NAN, 12.0, 3.0);
        payload.iron = Some(-1.0);
        payload.calcium = Some(40.0);
        record.complete(payload).unwrap();
        assert_eq!(record.nutrients.calories, 0.0);
        assert_eq!(record.nutrients.protein, 0.0);
        assert_eq!(record.nutrients.carbs, 12.0);
        assert_eq!(record.nutrients.iron, Some(0.0));
        assert_eq!(record.nutrients.calcium, Some(40.0));
    }

    #[test]
    fn serializes_flat_with_snake_case_status() {
        let record = MealRecord::pending("salad");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["calories"], 0.0);
        assert!(json.get("nutrients").is_none());
        assert!(json.get("vitamin_c").is_none());

        let restored: MealRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn status_display_and_parse() {
        assert_eq!(MealStatus::Complete.to_string(), "complete");
        assert_eq!("FAILED".parse::<MealStatus>().unwrap(), MealStatus::Failed);
        assert!("done".parse::<MealStatus>().is_err());
    }
}
