// cli_flow.rs: End-to-end run of the `nutritrack` binary against a temp data dir.
//
// Flow:
//   1. `goals` before any profile shows the default targets
//   2. `profile set` stores a complete profile; `goals` reflects it
//   3. `meal log` pending, `meal log` with estimate, `meal resolve`, `meal delete`
//   4. `history` and `summary --json` read the settled meals

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn nutritrack(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nutritrack"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_ok(data_dir: &Path, args: &[&str]) -> String {
    let out = nutritrack(data_dir, args);
    assert!(
        out.status.success(),
        "nutritrack {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

/// The meal id printed by `meal log`.
fn logged_id(stdout: &str) -> String {
    stdout
        .split_whitespace()
        .nth(2)
        .expect("meal id in output")
        .to_string()
}

#[test]
fn profile_meals_and_summary() {
    let data = TempDir::new().unwrap();
    let dir = data.path();

    // =========================================================
    // 1. Defaults
    // =========================================================

    let out = stdout_ok(dir, &["goals"]);
    assert!(out.contains("Profile incomplete"));
    assert!(out.contains("2200 kcal"));

    // =========================================================
    // 2. Profile
    // =========================================================

    stdout_ok(
        dir,
        &[
            "profile", "set", "--age", "25", "--sex", "male", "--height", "180", "--weight",
            "80", "--activity", "moderate", "--goal", "lose_weight", "--like", "oats",
        ],
    );

    let out = stdout_ok(dir, &["goals", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["targets"]["calories"], 2298);
    assert_eq!(value["targets"]["protein"], 230);
    assert_eq!(value["plan"]["adjustment"]["rule"], "weight_loss");

    let out = stdout_ok(dir, &["profile", "show", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["health_goals"][0], "Lose Weight");
    assert_eq!(value["likes"][0], "oats");

    let bad = nutritrack(dir, &["profile", "set", "--weight=-3"]);
    assert!(!bad.status.success());

    // =========================================================
    // 3. Meals
    // =========================================================

    let pending = logged_id(&stdout_ok(dir, &["meal", "log", "overnight oats"]));
    let instant = logged_id(&stdout_ok(
        dir,
        &["meal", "log", "turkey sandwich", "--calories", "480", "--protein", "32"],
    ));
    let doomed = logged_id(&stdout_ok(dir, &["meal", "log", "mystery snack"]));

    let out = stdout_ok(dir, &["meal", "list", "--status", "pending"]);
    assert!(out.contains(&pending));
    assert!(out.contains(&doomed));
    assert!(!out.contains(&instant));

    stdout_ok(
        dir,
        &["meal", "resolve", &pending, "--calories", "350", "--carbs", "55", "--fats", "9"],
    );
    stdout_ok(dir, &["meal", "delete", &doomed]);
    assert!(!nutritrack(dir, &["meal", "fail", &doomed]).status.success());

    let out = stdout_ok(dir, &["meal", "list", "--json"]);
    let meals: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(meals.as_array().unwrap().len(), 2);
    assert!(meals
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m["status"] == "complete"));

    // =========================================================
    // 4. History and summary
    // =========================================================

    let out = stdout_ok(dir, &["history"]);
    assert!(out.starts_with("Here is a summary of the user's logged meals from the past 7 days:"));
    assert!(out.contains("turkey sandwich. (Calories: 480, Protein: 32g, Carbs: 0g, Fats: 0g)"));
    assert!(out.contains("overnight oats"));
    assert!(!out.contains("mystery snack"));

    let out = stdout_ok(dir, &["summary", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["totals"]["meals"], 2);
    assert_eq!(value["totals"]["calories"], 830.0);
    assert_eq!(value["targets"]["calories"], 2298);
    assert_eq!(value["pending"], 0);
}

#[test]
fn empty_history_prints_sentinel() {
    let data = TempDir::new().unwrap();
    let out = stdout_ok(data.path(), &["history", "--days", "3"]);
    assert_eq!(out.trim_end(), "No meals logged recently.");
}
