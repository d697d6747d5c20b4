// history.rs: Text digest of recent meals for the diet chat provider.

use chrono::{DateTime, Duration, Utc};

use crate::record::MealRecord;

/// Returned when no complete record falls inside the window.
pub const NO_MEAL_HISTORY: &str = "No meals logged recently.";

/// Render complete records dated after `now - window_days` as a digest.
///
/// One line per record, in the order given (the store hands them over
/// newest first). Pending and failed records are skipped since their
/// nutrient fields carry no estimate. Numbers are rounded to whole units.
///
/// ```text
/// Here is a summary of the user's logged meals from the past 7 days:
/// - On 2024-03-10, user ate: chicken and rice. (Calories: 650, Protein: 35g, Carbs: 70g, Fats: 22g)
/// ```
pub fn format_history(records: &[MealRecord], window_days: u32, now: DateTime<Utc>) -> String {
    let cutoff = now - Duration::days(i64::from(window_days));

    let lines: Vec<String> = records
        .iter()
        .filter(|r| r.is_complete() && r.date > cutoff)
        .map(history_line)
        .collect();

    if lines.is_empty() {
        return NO_MEAL_HISTORY.to_string();
    }

    format!(
        "Here is a summary of the user's logged meals from the past {} days:\n{}",
        window_days,
        lines.join("\n")
    )
}

fn history_line(record: &MealRecord) -> String {
    let n = &record.nutrients;
    format!(
        "- On {}, user ate: {}. (Calories: {}, Protein: {}g, Carbs: {}g, Fats: {}g)",
        record.date.format("%Y-%m-%d"),
        record.description,
        n.calories.round() as i64,
        n.protein.round() as i64,
        n.carbs.round() as i64,
        n.fats.round() as i64,
    )
}
