//! # nt-cli
//!
//! Command-line interface for NutriTrack.
//!
//! - `nutritrack goals`: daily targets for the saved or given profile
//! - `nutritrack profile show/set/learn`: manage preferences
//! - `nutritrack meal log/resolve/fail/delete/list`: the meal lifecycle
//! - `nutritrack summary`: one day's intake against targets
//! - `nutritrack history`: the digest handed to the diet chat provider

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::{LogFormat, NutriConfig};

/// NutriTrack: log meals and track them against your daily targets.
#[derive(Parser)]
#[command(name = "nutritrack", version, about)]
struct Cli {
    /// Data directory (defaults to the platform data dir).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daily nutrient targets.
    Goals(commands::goals::GoalsArgs),
    /// View and edit your profile and preferences.
    Profile {
        #[command(subcommand)]
        command: commands::profile::ProfileCommands,
    },
    /// Log and manage meals.
    Meal {
        #[command(subcommand)]
        command: commands::meal::MealCommands,
    },
    /// Show a day's intake against your targets.
    Summary(commands::summary::SummaryArgs),
    /// Print the recent meal digest.
    History(commands::history::HistoryArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(NutriConfig::default_data_dir);
    let config = NutriConfig::load(&data_dir)?;

    init_tracing(config.log_format)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "nutritrack starting");

    match &cli.command {
        Commands::Goals(args) => commands::goals::execute(args, &config),
        Commands::Profile { command } => commands::profile::execute(command, &config),
        Commands::Meal { command } => commands::meal::execute(command, &config).await,
        Commands::Summary(args) => commands::summary::execute(args, &config),
        Commands::History(args) => commands::history::execute(args, &config),
    }
}

/// Levels used unless RUST_LOG names the target.
const DEFAULT_DIRECTIVES: &[&str] = &[
    "nutritrack=info",
    "nt_storage=warn",
    "nt_meals=warn",
    "nt_goals=warn",
    "nt_assist=warn",
];

// Logs go to stderr so they don't mix with command output on stdout.
fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}
