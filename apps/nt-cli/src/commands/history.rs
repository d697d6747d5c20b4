// history.rs: Print the meal digest sent to the diet chat provider.

use chrono::Utc;
use clap::Args;
use nt_meals::format_history;

use crate::config::NutriConfig;

#[derive(Args)]
pub struct HistoryArgs {
    /// Window in days (defaults to `history_window_days` from config.toml).
    #[arg(long)]
    pub days: Option<u32>,
}

pub fn execute(args: &HistoryArgs, config: &NutriConfig) -> anyhow::Result<()> {
    let days = args.days.unwrap_or(config.history_window_days);
    let store = config.open_meals()?;
    println!("{}", format_history(store.records(), days, Utc::now()));
    Ok(())
}
