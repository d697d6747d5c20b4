// engine.rs: Daily nutrient target engine.
//
// Every call runs the same pipeline:
//
// 1. BMR from the Mifflin-St Jeor equation
// 2. TDEE = BMR x activity factor
// 3. Calorie adjustment and macro split from the goal table (first match wins)
// 4. Macro grams at 4/4/9 kcal per gram (carbs/protein/fats)
// 5. Micronutrient reference intakes by age and sex
// 6. Round every output to the nearest whole number
//
// The goal table is ordered data, not a chain of conditionals. Rows are
// checked top to bottom and the last row requires nothing, so selection
// always succeeds.

use serde::Serialize;

use crate::error::GoalsError;
use crate::goal::{GoalSet, HealthGoal};
use crate::profile::{Profile, Sex};
use crate::targets::NutrientTargets;

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

const MSJ_WEIGHT_COEF: f64 = 10.0;
const MSJ_HEIGHT_COEF: f64 = 6.25;
const MSJ_AGE_COEF: f64 = 5.0;
const MSJ_MALE_CONSTANT: f64 = 5.0;
const MSJ_FEMALE_CONSTANT: f64 = -161.0;

/// Fractions of the calorie goal assigned to each macronutrient. Sums to 1.0.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MacroSplit {
    pub carbs: f64,
    pub protein: f64,
    pub fats: f64,
}

/// Which row of the goal table was applied.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Lose Weight together with Gain Muscle.
    Recomposition,
    /// Gain Muscle together with Improve Endurance.
    HybridTraining,
    WeightLoss,
    MuscleGain,
    Endurance,
    Maintenance,
}

/// One row of the goal table.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GoalAdjustment {
    pub rule: AdjustmentRule,
    /// Goals that must all be present for this row to match.
    #[serde(skip)]
    pub requires: &'static [HealthGoal],
    /// Added to TDEE, kcal.
    pub calorie_delta: f64,
    pub split: MacroSplit,
}

const fn split(carbs: f64, protein: f64, fats: f64) -> MacroSplit {
    MacroSplit {
        carbs,
        protein,
        fats,
    }
}

/// The goal table in priority order.
pub const ADJUSTMENT_TABLE: [GoalAdjustment; 6] = [
    GoalAdjustment {
        rule: AdjustmentRule::Recomposition,
        requires: &[HealthGoal::LoseWeight, HealthGoal::GainMuscle],
        calorie_delta: -250.0,
        split: split(0.35, 0.40, 0.25),
    },
    GoalAdjustment {
        rule: AdjustmentRule::HybridTraining,
        requires: &[HealthGoal::GainMuscle, HealthGoal::ImproveEndurance],
        calorie_delta: 250.0,
        split: split(0.50, 0.30, 0.20),
    },
    GoalAdjustment {
        rule: AdjustmentRule::WeightLoss,
        requires: &[HealthGoal::LoseWeight],
        calorie_delta: -500.0,
        split: split(0.35, 0.40, 0.25),
    },
    GoalAdjustment {
        rule: AdjustmentRule::MuscleGain,
        requires: &[HealthGoal::GainMuscle],
        calorie_delta: 300.0,
        split: split(0.45, 0.35, 0.20),
    },
    GoalAdjustment {
        rule: AdjustmentRule::Endurance,
        requires: &[HealthGoal::ImproveEndurance],
        calorie_delta: 0.0,
        split: split(0.55, 0.25, 0.20),
    },
    GoalAdjustment {
        rule: AdjustmentRule::Maintenance,
        requires: &[],
        calorie_delta: 0.0,
        split: split(0.45, 0.25, 0.30),
    },
];

/// Full result of one engine run, with the intermediate values kept.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TargetPlan {
    /// Basal metabolic rate, kcal/day (unrounded).
    pub bmr: f64,
    /// Total daily energy expenditure, kcal/day (unrounded).
    pub tdee: f64,
    /// TDEE plus the goal adjustment, floored at zero (unrounded).
    pub calorie_goal: f64,
    pub adjustment: GoalAdjustment,
    pub targets: NutrientTargets,
}

/// Compute daily targets for a profile and goal set.
///
/// Total over well-formed profiles. Inputs that slipped past validation
/// still never produce NaN or negative values: energy floors at zero and
/// non-finite intermediates round to zero.
pub fn compute_targets(profile: &Profile, goals: &GoalSet) -> NutrientTargets {
    compute_plan(profile, goals).targets
}

/// Validate the profile first, then compute targets.
pub fn checked_targets(profile: &Profile, goals: &GoalSet) -> Result<NutrientTargets, GoalsError> {
    profile.validate()?;
    Ok(compute_targets(profile, goals))
}

/// Compute targets and keep BMR, TDEE and the applied goal row.
pub fn compute_plan(profile: &Profile, goals: &GoalSet) -> TargetPlan {
    let bmr = basal_metabolic_rate(profile);
    let tdee = bmr * profile.activity_level.factor();
    let adjustment = select_adjustment(goals);
    let calorie_goal = (tdee + adjustment.calorie_delta).max(0.0);

    // Macros split the rounded calorie target, not the raw goal.
    let calories = round_non_negative(calorie_goal);
    let energy = f64::from(calories);
    let protein_g = energy * adjustment.split.protein / KCAL_PER_GRAM_PROTEIN;
    let carbs_g = energy * adjustment.split.carbs / KCAL_PER_GRAM_CARBS;
    let fats_g = energy * adjustment.split.fats / KCAL_PER_GRAM_FAT;

    let micros = reference_intakes(profile.age, profile.sex);

    tracing::trace!(
        bmr,
        tdee,
        calorie_goal,
        rule = ?adjustment.rule,
        "computed nutrient targets"
    );

    TargetPlan {
        bmr,
        tdee,
        calorie_goal,
        adjustment,
        targets: NutrientTargets {
            calories,
            protein: round_non_negative(protein_g),
            carbs: round_non_negative(carbs_g),
            fats: round_non_negative(fats_g),
            calcium: micros.calcium,
            iron: micros.iron,
            potassium: micros.potassium,
            vitamin_c: micros.vitamin_c,
            vitamin_d: micros.vitamin_d,
        },
    }
}

/// Mifflin-St Jeor BMR. `Other` takes the mean of the male and female equations.
pub fn basal_metabolic_rate(profile: &Profile) -> f64 {
    let base = MSJ_WEIGHT_COEF * profile.weight_kg + MSJ_HEIGHT_COEF * profile.height_cm
        - MSJ_AGE_COEF * f64::from(profile.age);
    let male = base + MSJ_MALE_CONSTANT;
    let female = base + MSJ_FEMALE_CONSTANT;
    match profile.sex {
        Sex::Male => male,
        Sex::Female => female,
        Sex::Other => (male + female) / 2.0,
    }
}

/// First row of the goal table whose required goals are all present.
pub fn select_adjustment(goals: &GoalSet) -> GoalAdjustment {
    let maintenance = ADJUSTMENT_TABLE[ADJUSTMENT_TABLE.len() - 1];
    ADJUSTMENT_TABLE
        .iter()
        .find(|row| goals.contains_all(row.requires))
        .copied()
        .unwrap_or(maintenance)
}

struct ReferenceIntakes {
    calcium: u32,
    iron: u32,
    potassium: u32,
    vitamin_c: u32,
    vitamin_d: u32,
}

// `Other` uses the male column throughout.
fn reference_intakes(age: u32, sex: Sex) -> ReferenceIntakes {
    let female = sex == Sex::Female;
    ReferenceIntakes {
        calcium: if (female && age > 50) || (!female && age > 70) {
            1200
        } else {
            1000
        },
        iron: if female && (19..=50).contains(&age) {
            18
        } else {
            8
        },
        potassium: if female { 2600 } else { 3400 },
        vitamin_c: if female { 75 } else { 90 },
        vitamin_d: if age > 70 { 20 } else { 15 },
    }
}

fn round_non_negative(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
