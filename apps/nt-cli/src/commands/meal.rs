// meal.rs: Meal subcommands: log, resolve, fail, delete, list.
//
// `log` with nutrient flags runs the full logging workflow, using the flags
// as the analysis result. Without them the meal stays pending until a later
// `resolve` or `fail`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use clap::{Args, Subcommand};
use nt_assist::{shared_store, AssistError, MealAnalyzer, MealLogger, Settlement};
use nt_meals::{MealRecord, MealStatus, NutrientPayload, RecordStore};
use uuid::Uuid;

use crate::config::NutriConfig;

/// Nutrient estimate entered by hand.
#[derive(Args, Debug, Default, Clone)]
pub struct EstimateArgs {
    /// Energy in kcal.
    #[arg(long)]
    pub calories: Option<f64>,
    /// Grams.
    #[arg(long)]
    pub protein: Option<f64>,
    /// Grams.
    #[arg(long)]
    pub carbs: Option<f64>,
    /// Grams.
    #[arg(long)]
    pub fats: Option<f64>,
    /// Ingredient, repeatable.
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,
    /// Milligrams.
    #[arg(long)]
    pub calcium: Option<f64>,
    /// Milligrams.
    #[arg(long)]
    pub iron: Option<f64>,
    /// Milligrams.
    #[arg(long)]
    pub potassium: Option<f64>,
    /// Milligrams.
    #[arg(long)]
    pub vitamin_c: Option<f64>,
    /// Micrograms.
    #[arg(long)]
    pub vitamin_d: Option<f64>,
}

impl EstimateArgs {
    pub fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fats.is_none()
            && self.ingredients.is_empty()
    }

    /// Missing macros count as zero; missing micronutrients stay unknown.
    pub fn payload(&self) -> NutrientPayload {
        NutrientPayload {
            calories: self.calories.unwrap_or(0.0),
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fats: self.fats.unwrap_or(0.0),
            ingredients: self.ingredients.clone(),
            calcium: self.calcium,
            iron: self.iron,
            potassium: self.potassium,
            vitamin_c: self.vitamin_c,
            vitamin_d: self.vitamin_d,
        }
    }
}

/// Analyzer that answers with the estimate given on the command line.
struct ManualEstimate(NutrientPayload);

#[async_trait]
impl MealAnalyzer for ManualEstimate {
    async fn analyze(&self, _description: &str) -> Result<NutrientPayload, AssistError> {
        Ok(self.0.clone())
    }
}

#[derive(Subcommand)]
pub enum MealCommands {
    /// Log a meal. Pass nutrient flags to settle it right away.
    Log {
        /// What you ate (e.g. "grilled chicken with rice").
        description: String,
        #[command(flatten)]
        estimate: EstimateArgs,
    },
    /// Complete a pending meal with a nutrient estimate.
    Resolve {
        /// Meal ID.
        id: String,
        #[command(flatten)]
        estimate: EstimateArgs,
    },
    /// Mark a pending meal as failed.
    Fail {
        /// Meal ID.
        id: String,
    },
    /// Delete a meal in any state.
    Delete {
        /// Meal ID.
        id: String,
    },
    /// List meals, newest first.
    List {
        /// Filter by status (pending, complete, failed).
        #[arg(long)]
        status: Option<MealStatus>,
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub async fn execute(cmd: &MealCommands, config: &NutriConfig) -> anyhow::Result<()> {
    let mut store = config.open_meals()?;

    match cmd {
        MealCommands::Log {
            description,
            estimate,
        } => {
            let record = log_meal(store, config, description, estimate).await?;
            println!("Logged meal {} ({})", record.id, record.status);
            if record.status == MealStatus::Pending {
                println!("Settle it with `nutritrack meal resolve {} --calories ...`", record.id);
            }
            Ok(())
        }
        MealCommands::Resolve { id, estimate } => {
            let record = resolve_meal(&mut store, id, estimate)?;
            println!(
                "Resolved meal {}: {:.0} kcal",
                record.id, record.nutrients.calories
            );
            Ok(())
        }
        MealCommands::Fail { id } => {
            let id = parse_id(id)?;
            store
                .fail(id)?
                .ok_or_else(|| anyhow::anyhow!("meal not found: {}", id))?;
            println!("Marked meal {} as failed.", id);
            Ok(())
        }
        MealCommands::Delete { id } => {
            let id = parse_id(id)?;
            if !store.delete(id)? {
                anyhow::bail!("meal not found: {}", id);
            }
            println!("Deleted meal {}.", id);
            Ok(())
        }
        MealCommands::List { status, json } => list_meals(&store, *status, *json),
    }
}

async fn log_meal(
    mut store: RecordStore,
    config: &NutriConfig,
    description: &str,
    estimate: &EstimateArgs,
) -> anyhow::Result<MealRecord> {
    if estimate.is_empty() {
        return Ok(store.create(description)?);
    }

    let logger = MealLogger::new(
        shared_store(store),
        Arc::new(ManualEstimate(estimate.payload())),
    )
    .with_timeout(Duration::from_secs(config.analysis_timeout_secs));

    match logger.log(description).await? {
        Settlement::Completed(record) | Settlement::Failed { record, .. } => Ok(record),
        Settlement::Dropped { record_id } => {
            anyhow::bail!("meal {} was removed before it settled", record_id)
        }
    }
}

fn resolve_meal(
    store: &mut RecordStore,
    id: &str,
    estimate: &EstimateArgs,
) -> anyhow::Result<MealRecord> {
    let id = parse_id(id)?;
    if estimate.is_empty() {
        anyhow::bail!("resolve needs at least one nutrient flag (e.g. --calories)");
    }
    store
        .resolve(id, estimate.payload())?
        .ok_or_else(|| anyhow::anyhow!("meal not found: {}", id))
}

fn list_meals(store: &RecordStore, status: Option<MealStatus>, json: bool) -> anyhow::Result<()> {
    let meals = match status {
        Some(status) => store.list_by_status(status),
        None => store.list(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&meals)?);
        return Ok(());
    }

    if meals.is_empty() {
        println!("No meals found.");
        return Ok(());
    }

    println!(
        "{:<38} {:<9} {:<17} {:>6} DESCRIPTION",
        "ID", "STATUS", "DATE", "KCAL"
    );
    println!("{}", "-".repeat(96));
    for m in &meals {
        let kcal = if m.is_complete() {
            format!("{:.0}", m.nutrients.calories)
        } else {
            "-".to_string()
        };
        println!(
            "{:<38} {:<9} {:<17} {:>6} {}",
            m.id,
            m.status.to_string(),
            m.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            kcal,
            truncate(&m.description, 40),
        );
    }
    println!("\n{} meal(s) total.", meals.len());
    Ok(())
}

fn parse_id(id: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(id).map_err(|e| anyhow::anyhow!("invalid meal id {:?}: {}", id, e))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn estimate(calories: f64) -> EstimateArgs {
        EstimateArgs {
            calories: Some(calories),
            protein: Some(20.0),
            ingredients: vec!["rice".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn log_without_estimate_stays_pending() {
        let dir = TempDir::new().unwrap();
        let config = NutriConfig::for_data_dir(dir.path());

        let store = config.open_meals().unwrap();
        let record = log_meal(store, &config, "rice bowl", &EstimateArgs::default())
            .await
            .unwrap();
        assert_eq!(record.status, MealStatus::Pending);

        let reopened = config.open_meals().unwrap();
        assert_eq!(reopened.get(record.id).unwrap().status, MealStatus::Pending);
    }

    #[tokio::test]
    async fn log_with_estimate_completes() {
        let dir = TempDir::new().unwrap();
        let config = NutriConfig::for_data_dir(dir.path());

        let store = config.open_meals().unwrap();
        let record = log_meal(store, &config, "rice bowl", &estimate(540.0))
            .await
            .unwrap();
        assert_eq!(record.status, MealStatus::Complete);

        let reopened = config.open_meals().unwrap();
        let stored = reopened.get(record.id).unwrap();
        assert_eq!(stored.nutrients.calories, 540.0);
        assert_eq!(stored.nutrients.ingredients, vec!["rice"]);
        assert_eq!(stored.nutrients.carbs, 0.0);
    }

    #[test]
    fn resolve_pending_meal() {
        let dir = TempDir::new().unwrap();
        let config = NutriConfig::for_data_dir(dir.path());
        let mut store = config.open_meals().unwrap();
        let pending = store.create("soup").unwrap();

        let record = resolve_meal(&mut store, &pending.id.to_string(), &estimate(210.0)).unwrap();
        assert_eq!(record.status, MealStatus::Complete);
        assert_eq!(record.nutrients.calories, 210.0);
    }

    #[test]
    fn resolve_requires_an_estimate_and_a_known_id() {
        let dir = TempDir::new().unwrap();
        let config = NutriConfig::for_data_dir(dir.path());
        let mut store = config.open_meals().unwrap();
        let pending = store.create("soup").unwrap();

        assert!(resolve_meal(&mut store, &pending.id.to_string(), &EstimateArgs::default()).is_err());
        assert!(resolve_meal(&mut store, &Uuid::new_v4().to_string(), &estimate(1.0)).is_err());
        assert!(resolve_meal(&mut store, "not-a-uuid", &estimate(1.0)).is_err());
        assert_eq!(store.get(pending.id).unwrap().status, MealStatus::Pending);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("crème brûlée with berries", 10), "crème b...");
    }
}
