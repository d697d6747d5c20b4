// config.rs: CLI configuration and store wiring.
//
// NutriConfig decides where the slots live and how the CLI behaves. The
// data directory comes from `--data-dir` or the platform data dir; an
// optional `config.toml` inside it overrides the remaining fields:
//
//   history_window_days = 7
//   log_format = "json"
//   journal = true

use std::path::{Path, PathBuf};

use anyhow::Context;
use nt_goals::PreferencesStore;
use nt_meals::{JournalObserver, RecordStore};
use nt_storage::FileSlots;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.toml";
pub const JOURNAL_FILE: &str = "events.jsonl";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutriConfig {
    /// Directory holding the slot files. Never read from config.toml.
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Days of complete meals included in the history digest.
    #[serde(default = "default_history_window_days")]
    pub history_window_days: u32,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Append every store event to `events.jsonl` in the data dir.
    #[serde(default)]
    pub journal: bool,

    /// Seconds to wait for an analysis result before failing the meal.
    #[serde(default = "default_analysis_timeout_secs")]
    pub analysis_timeout_secs: u64,
}

fn default_history_window_days() -> u32 {
    nt_assist::DEFAULT_HISTORY_WINDOW_DAYS
}

fn default_analysis_timeout_secs() -> u64 {
    30
}

impl NutriConfig {
    /// Defaults rooted at `data_dir`.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            history_window_days: default_history_window_days(),
            log_format: LogFormat::default(),
            journal: false,
            analysis_timeout_secs: default_analysis_timeout_secs(),
        }
    }

    /// `<platform data dir>/nutritrack`, or `.nutritrack` when the platform
    /// has no data dir.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("nutritrack"))
            .unwrap_or_else(|| PathBuf::from(".nutritrack"))
    }

    /// Load `config.toml` from `data_dir`, falling back to defaults when
    /// the file does not exist.
    pub fn load(data_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::for_data_dir(data_dir));
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: NutriConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config in {}", path.display()))?;
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    fn slots(&self) -> anyhow::Result<FileSlots> {
        FileSlots::new(&self.data_dir)
            .with_context(|| format!("cannot use data dir {}", self.data_dir.display()))
    }

    /// Open the meal store, attaching the journal when enabled.
    pub fn open_meals(&self) -> anyhow::Result<RecordStore> {
        let mut store = RecordStore::open(Box::new(self.slots()?));
        if self.journal {
            store.subscribe(JournalObserver::new(self.journal_path()));
        }
        Ok(store)
    }

    pub fn open_preferences(&self) -> anyhow::Result<PreferencesStore> {
        Ok(PreferencesStore::open(Box::new(self.slots()?)))
    }
}
