// profile.rs: Biometric profile consumed by the target engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GoalsError;

/// Biological sex as used by the BMR and reference-intake formulas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    /// BMR uses the mean of the male and female equations; reference
    /// intakes use the male column.
    Other,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
            Sex::Other => write!(f, "other"),
        }
    }
}

impl FromStr for Sex {
    type Err = GoalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            _ => Err(GoalsError::UnknownValue {
                kind: "sex",
                value: s.to_string(),
            }),
        }
    }
}

/// Habitual activity level, mapped to a TDEE multiplier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise.
    #[default]
    Sedentary,
    /// Light exercise 1-3 days/week.
    Light,
    /// Moderate exercise 3-5 days/week.
    Moderate,
    /// Hard exercise 6-7 days/week.
    Active,
    /// Physical job or twice-daily training.
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier applied to BMR to estimate total daily energy expenditure.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityLevel::Sedentary => write!(f, "sedentary"),
            ActivityLevel::Light => write!(f, "light"),
            ActivityLevel::Moderate => write!(f, "moderate"),
            ActivityLevel::Active => write!(f, "active"),
            ActivityLevel::VeryActive => write!(f, "very_active"),
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = GoalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            _ => Err(GoalsError::UnknownValue {
                kind: "activity level",
                value: s.to_string(),
            }),
        }
    }
}

/// A user's biometric profile. Immutable input to one engine call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Age in whole years.
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
}

impl Profile {
    /// Build a profile, rejecting values the formulas are not defined for.
    pub fn new(
        age: u32,
        sex: Sex,
        height_cm: f64,
        weight_kg: f64,
        activity_level: ActivityLevel,
    ) -> Result<Self, GoalsError> {
        let profile = Self {
            age,
            sex,
            height_cm,
            weight_kg,
            activity_level,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check that every numeric field is positive and finite.
    pub fn validate(&self) -> Result<(), GoalsError> {
        if self.age == 0 {
            return Err(GoalsError::InvalidProfile {
                field: "age",
                reason: "must be at least 1 year".into(),
            });
        }
        check_positive("height_cm", self.height_cm)?;
        check_positive("weight_kg", self.weight_kg)?;
        Ok(())
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), GoalsError> {
    if !value.is_finite() {
        return Err(GoalsError::InvalidProfile {
            field,
            reason: format!("must be a finite number, got {}", value),
        });
    }
    if value <= 0.0 {
        return Err(GoalsError::InvalidProfile {
            field,
            reason: format!("must be greater than zero, got {}", value),
        });
    }
    Ok(())
}
