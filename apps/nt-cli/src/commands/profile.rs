// profile.rs: Profile subcommands: show, set, learn.

use clap::{Args, Subcommand};
use nt_goals::{
    ActivityLevel, HealthGoal, LearnedPreferences, PreferencesStore, Profile, Sex, UserPreferences,
};

use crate::config::NutriConfig;

/// Biometric and goal flags shared by `profile set` and `goals`.
#[derive(Args, Debug, Default, Clone)]
pub struct ProfileArgs {
    /// Age in whole years.
    #[arg(long)]
    pub age: Option<u32>,
    /// male, female or other.
    #[arg(long)]
    pub sex: Option<Sex>,
    /// Height in centimetres.
    #[arg(long)]
    pub height: Option<f64>,
    /// Weight in kilograms.
    #[arg(long)]
    pub weight: Option<f64>,
    /// sedentary, light, moderate, active or very_active.
    #[arg(long)]
    pub activity: Option<ActivityLevel>,
    /// Health goal, repeatable (e.g. "lose weight" or gain_muscle).
    /// Replaces the saved goals when given.
    #[arg(long = "goal")]
    pub goals: Vec<HealthGoal>,
}

impl ProfileArgs {
    /// Overlay the given flags on `prefs`.
    pub fn apply_to(&self, prefs: &mut UserPreferences) {
        if let Some(age) = self.age {
            prefs.age = Some(age);
        }
        if let Some(sex) = self.sex {
            prefs.sex = Some(sex);
        }
        if let Some(height) = self.height {
            prefs.height_cm = Some(height);
        }
        if let Some(weight) = self.weight {
            prefs.weight_kg = Some(weight);
        }
        if let Some(activity) = self.activity {
            prefs.activity_level = activity;
        }
        if !self.goals.is_empty() {
            prefs.health_goals = self.goals.iter().copied().collect();
        }
    }
}

/// The profile when every biometric field is set.
///
/// Unlike `UserPreferences::profile`, a complete but invalid profile is an
/// error here so the user sees what was rejected.
pub fn complete_profile(prefs: &UserPreferences) -> anyhow::Result<Option<Profile>> {
    match (prefs.age, prefs.sex, prefs.height_cm, prefs.weight_kg) {
        (Some(age), Some(sex), Some(height), Some(weight)) => Ok(Some(Profile::new(
            age,
            sex,
            height,
            weight,
            prefs.activity_level,
        )?)),
        _ => Ok(None),
    }
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Show saved preferences.
    Show {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Update profile fields, goals and food preferences.
    Set {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Remove all saved goals.
        #[arg(long, conflicts_with = "goals")]
        clear_goals: bool,
        /// Dietary restriction to add, repeatable (e.g. Vegetarian).
        #[arg(long = "restriction")]
        restrictions: Vec<String>,
        /// Liked food to add, repeatable.
        #[arg(long = "like")]
        likes: Vec<String>,
        /// Disliked food to add, repeatable.
        #[arg(long = "dislike")]
        dislikes: Vec<String>,
    },
    /// Merge learned likes and dislikes, skipping ones already known.
    Learn {
        #[arg(long = "like")]
        likes: Vec<String>,
        #[arg(long = "dislike")]
        dislikes: Vec<String>,
    },
}

pub fn execute(cmd: &ProfileCommands, config: &NutriConfig) -> anyhow::Result<()> {
    let mut store = config.open_preferences()?;

    match cmd {
        ProfileCommands::Show { json } => show_profile(&store, *json),
        ProfileCommands::Set {
            profile,
            clear_goals,
            restrictions,
            likes,
            dislikes,
        } => set_profile(&mut store, profile, *clear_goals, restrictions, likes, dislikes),
        ProfileCommands::Learn { likes, dislikes } => learn(&mut store, likes, dislikes),
    }
}

fn show_profile(store: &PreferencesStore, json: bool) -> anyhow::Result<()> {
    let prefs = store.get();
    if json {
        println!("{}", serde_json::to_string_pretty(prefs)?);
        return Ok(());
    }

    println!("Age:          {}", display_or_unset(prefs.age));
    println!("Sex:          {}", display_or_unset(prefs.sex));
    println!("Height:       {}", display_or_unset(prefs.height_cm.map(|h| format!("{} cm", h))));
    println!("Weight:       {}", display_or_unset(prefs.weight_kg.map(|w| format!("{} kg", w))));
    println!("Activity:     {}", prefs.activity_level);
    println!("Goals:        {}", join_or_none(prefs.health_goals.iter().map(|g| g.to_string())));
    println!("Restrictions: {}", join_or_none(prefs.dietary_restrictions.iter().cloned()));
    println!("Likes:        {}", join_or_none(prefs.likes.iter().cloned()));
    println!("Dislikes:     {}", join_or_none(prefs.dislikes.iter().cloned()));
    Ok(())
}

fn set_profile(
    store: &mut PreferencesStore,
    profile: &ProfileArgs,
    clear_goals: bool,
    restrictions: &[String],
    likes: &[String],
    dislikes: &[String],
) -> anyhow::Result<()> {
    let mut prefs = store.get().clone();
    profile.apply_to(&mut prefs);
    if clear_goals {
        prefs.health_goals = Default::default();
    }
    for restriction in restrictions {
        let restriction = restriction.trim();
        if !restriction.is_empty() && !prefs.dietary_restrictions.iter().any(|r| r == restriction) {
            prefs.dietary_restrictions.push(restriction.to_string());
        }
    }
    prefs.merge_learned(&LearnedPreferences {
        likes: likes.to_vec(),
        dislikes: dislikes.to_vec(),
    });

    complete_profile(&prefs)?;
    store.save(prefs)?;
    tracing::info!("preferences saved");
    println!("Profile updated.");
    Ok(())
}

fn learn(store: &mut PreferencesStore, likes: &[String], dislikes: &[String]) -> anyhow::Result<()> {
    let learned = LearnedPreferences {
        likes: likes.to_vec(),
        dislikes: dislikes.to_vec(),
    };
    if store.merge_learned(&learned)? {
        println!("Preferences updated.");
    } else {
        println!("Nothing new to learn.");
    }
    Ok(())
}

fn display_or_unset<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

fn join_or_none(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
