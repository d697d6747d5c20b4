// summary.rs: Per-day intake totals and progress against targets.

use chrono::{NaiveDate, TimeZone, Utc};
use nt_goals::NutrientTargets;
use serde::{Deserialize, Serialize};

use crate::record::MealRecord;

/// Nutrients consumed on one day, summed over complete records.
///
/// Missing micronutrient estimates count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub day: NaiveDate,
    pub meals: usize,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub calcium: f64,
    pub iron: f64,
    pub potassium: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
}

/// One row of a day's progress view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutrientProgress {
    pub name: &'static str,
    pub unit: &'static str,
    pub consumed: f64,
    pub goal: u32,
}

impl NutrientProgress {
    /// Consumed as a fraction of the goal, capped at 1.0. Zero goals read as 0.
    pub fn fraction(&self) -> f64 {
        if self.goal == 0 {
            return 0.0;
        }
        (self.consumed / f64::from(self.goal)).clamp(0.0, 1.0)
    }
}

impl DailyTotals {
    /// Totals for `day` in UTC.
    pub fn for_day(records: &[MealRecord], day: NaiveDate) -> Self {
        Self::for_day_in(records, day, &Utc)
    }

    /// Totals for `day` as seen in time zone `tz`.
    pub fn for_day_in<Tz: TimeZone>(records: &[MealRecord], day: NaiveDate, tz: &Tz) -> Self {
        let mut totals = DailyTotals {
            day,
            ..Default::default()
        };
        for record in records
            .iter()
            .filter(|r| r.is_complete() && r.date.with_timezone(tz).date_naive() == day)
        {
            let n = &record.nutrients;
            totals.meals += 1;
            totals.calories += n.calories;
            totals.protein += n.protein;
            totals.carbs += n.carbs;
            totals.fats += n.fats;
            totals.calcium += n.calcium.unwrap_or(0.0);
            totals.iron += n.iron.unwrap_or(0.0);
            totals.potassium += n.potassium.unwrap_or(0.0);
            totals.vitamin_c += n.vitamin_c.unwrap_or(0.0);
            totals.vitamin_d += n.vitamin_d.unwrap_or(0.0);
        }
        totals
    }

    /// Macro rows followed by micronutrient rows.
    pub fn progress(&self, targets: &NutrientTargets) -> Vec<NutrientProgress> {
        let row = |name: &'static str, unit: &'static str, consumed: f64, goal: u32| NutrientProgress {
            name,
            unit,
            consumed,
            goal,
        };
        vec![
            row("Calories", "kcal", self.calories, targets.calories),
            row("Protein", "g", self.protein, targets.protein),
            row("Carbs", "g", self.carbs, targets.carbs),
            row("Fats", "g", self.fats, targets.fats),
            row("Calcium", "mg", self.calcium, targets.calcium),
            row("Iron", "mg", self.iron, targets.iron),
            row("Potassium", "mg", self.potassium, targets.potassium),
            row("Vitamin C", "mg", self.vitamin_c, targets.vitamin_c),
            row("Vitamin D", "mcg", self.vitamin_d, targets.vitamin_d),
        ]
    }
}
