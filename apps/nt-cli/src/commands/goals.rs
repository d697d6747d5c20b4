// goals.rs: Show daily targets for the saved profile, optionally overridden by flags.

use clap::Args;
use nt_goals::{compute_plan, NutrientTargets, TargetPlan, UserPreferences};

use crate::commands::profile::{complete_profile, ProfileArgs};
use crate::config::NutriConfig;

#[derive(Args)]
pub struct GoalsArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Also show BMR, TDEE and the goal rule applied.
    #[arg(long)]
    pub explain: bool,
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &GoalsArgs, config: &NutriConfig) -> anyhow::Result<()> {
    let store = config.open_preferences()?;
    let mut prefs = store.get().clone();
    args.profile.apply_to(&mut prefs);

    let plan = target_plan(&prefs)?;
    let targets = plan.map(|p| p.targets).unwrap_or_else(NutrientTargets::fallback);

    if args.json {
        let value = serde_json::json!({
            "targets": targets,
            "plan": plan,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match &plan {
        Some(plan) if args.explain => {
            println!("BMR:          {:.0} kcal", plan.bmr);
            println!("TDEE:         {:.0} kcal ({})", plan.tdee, prefs.activity_level);
            println!(
                "Goal rule:    {:?} ({:+.0} kcal)",
                plan.adjustment.rule, plan.adjustment.calorie_delta
            );
            println!();
        }
        Some(_) => {}
        None => {
            println!("Profile incomplete; showing default targets.");
            println!("Set age, sex, height and weight with `nutritrack profile set`.");
            println!();
        }
    }
    print_targets(&targets);
    Ok(())
}

/// Engine plan when the profile is complete, `None` otherwise.
fn target_plan(prefs: &UserPreferences) -> anyhow::Result<Option<TargetPlan>> {
    Ok(complete_profile(prefs)?.map(|profile| compute_plan(&profile, &prefs.health_goals)))
}

fn print_targets(t: &NutrientTargets) {
    println!("{:<12} {:>6}", "NUTRIENT", "TARGET");
    println!("{}", "-".repeat(24));
    for (name, value, unit) in [
        ("Calories", t.calories, "kcal"),
        ("Protein", t.protein, "g"),
        ("Carbs", t.carbs, "g"),
        ("Fats", t.fats, "g"),
        ("Calcium", t.calcium, "mg"),
        ("Iron", t.iron, "mg"),
        ("Potassium", t.potassium, "mg"),
        ("Vitamin C", t.vitamin_c, "mg"),
        ("Vitamin D", t.vitamin_d, "mcg"),
    ] {
        println!("{:<12} {:>6} {}", name, value, unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nt_goals::{ActivityLevel, AdjustmentRule, HealthGoal, Sex};

    #[test]
    fn incomplete_profile_has_no_plan() {
        let prefs = UserPreferences {
            age: Some(30),
            ..Default::default()
        };
        assert!(target_plan(&prefs).unwrap().is_none());
    }

    #[test]
    fn flags_override_saved_preferences() {
        let mut prefs = UserPreferences {
            age: Some(25),
            sex: Some(Sex::Male),
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            activity_level: ActivityLevel::Moderate,
            ..Default::default()
        };
        let args = ProfileArgs {
            goals: vec![HealthGoal::LoseWeight, HealthGoal::GainMuscle],
            ..Default::default()
        };
        args.apply_to(&mut prefs);

        let plan = target_plan(&prefs).unwrap().unwrap();
        assert_eq!(plan.adjustment.rule, AdjustmentRule::Recomposition);
        assert_eq!(plan.targets.calories, 2548);
    }

    #[test]
    fn invalid_override_is_an_error() {
        let prefs = UserPreferences {
            age: Some(30),
            sex: Some(Sex::Female),
            height_cm: Some(0.0),
            weight_kg: Some(60.0),
            ..Default::default()
        };
        assert!(target_plan(&prefs).is_err());
    }
}
