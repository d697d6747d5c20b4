// summary.rs: One day's intake against the daily targets.

use chrono::{Local, NaiveDate};
use clap::Args;
use nt_goals::NutrientTargets;
use nt_meals::{DailyTotals, MealStatus, RecordStore};

use crate::config::NutriConfig;

#[derive(Args)]
pub struct SummaryArgs {
    /// Day to summarize, YYYY-MM-DD (defaults to today, local time).
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &SummaryArgs, config: &NutriConfig) -> anyhow::Result<()> {
    let day = args.date.unwrap_or_else(|| Local::now().date_naive());
    let store = config.open_meals()?;
    let targets = config.open_preferences()?.get().daily_targets();

    let totals = DailyTotals::for_day_in(store.records(), day, &Local);
    let pending = pending_on(&store, day);

    if args.json {
        let value = serde_json::json!({
            "totals": totals,
            "targets": targets,
            "pending": pending,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_summary(&totals, &targets);
    if pending > 0 {
        println!("\n{} meal(s) still being analyzed.", pending);
    }
    Ok(())
}

fn pending_on(store: &RecordStore, day: NaiveDate) -> usize {
    store
        .for_day(day, &Local)
        .iter()
        .filter(|r| r.status == MealStatus::Pending)
        .count()
}

fn print_summary(totals: &DailyTotals, targets: &NutrientTargets) {
    println!("Summary for {} ({} meal(s))", totals.day, totals.meals);
    println!();
    println!("{:<10} {:>8} {:>8}  {:<4} {:>5}", "NUTRIENT", "EATEN", "TARGET", "UNIT", "PCT");
    println!("{}", "-".repeat(41));
    for row in totals.progress(targets) {
        println!(
            "{:<10} {:>8.0} {:>8}  {:<4} {:>4.0}%",
            row.name,
            row.consumed,
            row.goal,
            row.unit,
            row.fraction() * 100.0
        );
    }
}
