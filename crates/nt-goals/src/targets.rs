// targets.rs: NutrientTargets, the engine's output record.

use serde::{Deserialize, Serialize};

/// Daily intake targets. Every field is a non-negative whole number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NutrientTargets {
    /// Energy, kcal.
    pub calories: u32,
    /// Grams.
    pub protein: u32,
    /// Grams.
    pub carbs: u32,
    /// Grams.
    pub fats: u32,
    /// Milligrams.
    pub calcium: u32,
    /// Milligrams.
    pub iron: u32,
    /// Milligrams.
    pub potassium: u32,
    /// Milligrams.
    pub vitamin_c: u32,
    /// Micrograms.
    pub vitamin_d: u32,
}

impl NutrientTargets {
    /// Targets shown before the user has entered a complete profile.
    pub fn fallback() -> Self {
        Self {
            calories: 2200,
            protein: 140,
            carbs: 250,
            fats: 70,
            calcium: 1000,
            iron: 8,
            potassium: 3400,
            vitamin_c: 90,
            vitamin_d: 15,
        }
    }
}

impl Default for NutrientTargets {
    fn default() -> Self {
        Self::fallback()
    }
}
