// events.rs: Store change events and observer dispatch.
//
// Every store mutation produces one MealEvent. Observers receive the event
// together with the full record collection (newest first) so a UI surface
// can simply re-render from the slice it is handed.
//
// Dispatch is synchronous: all registered observers have run before the
// mutating call returns. An observer error is logged and does not stop the
// remaining observers.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MealError;
use crate::record::{MealRecord, MealStatus};

/// A change applied to the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MealEvent {
    /// A pending record was logged.
    MealCreated {
        record_id: Uuid,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// Analysis completed and the payload was merged.
    MealResolved {
        record_id: Uuid,
        calories: f64,
        timestamp: DateTime<Utc>,
    },

    /// Analysis failed.
    MealFailed {
        record_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// The record was removed.
    MealDeleted {
        record_id: Uuid,
        previous_status: MealStatus,
        timestamp: DateTime<Utc>,
    },
}

impl MealEvent {
    pub fn event_type(&self) -> &str {
        match self {
            MealEvent::MealCreated { .. } => "meal_created",
            MealEvent::MealResolved { .. } => "meal_resolved",
            MealEvent::MealFailed { .. } => "meal_failed",
            MealEvent::MealDeleted { .. } => "meal_deleted",
        }
    }

    pub fn record_id(&self) -> Uuid {
        match self {
            MealEvent::MealCreated { record_id, .. }
            | MealEvent::MealResolved { record_id, .. }
            | MealEvent::MealFailed { record_id, .. }
            | MealEvent::MealDeleted { record_id, .. } => *record_id,
        }
    }

    pub fn created(record: &MealRecord) -> Self {
        MealEvent::MealCreated {
            record_id: record.id,
            description: record.description.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn resolved(record: &MealRecord) -> Self {
        MealEvent::MealResolved {
            record_id: record.id,
            calories: record.nutrients.calories,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(record_id: Uuid) -> Self {
        MealEvent::MealFailed {
            record_id,
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(record: &MealRecord) -> Self {
        MealEvent::MealDeleted {
            record_id: record.id,
            previous_status: record.status,
            timestamp: Utc::now(),
        }
    }
}

/// Receives store changes.
///
/// Closures of the form `Fn(&MealEvent, &[MealRecord])` implement this
/// trait directly.
pub trait RecordObserver: Send {
    /// Handle a change. Errors are logged but don't stop other observers.
    fn on_change(&self, event: &MealEvent, records: &[MealRecord]) -> Result<(), MealError>;
}

impl<F> RecordObserver for F
where
    F: Fn(&MealEvent, &[MealRecord]) + Send,
{
    fn on_change(&self, event: &MealEvent, records: &[MealRecord]) -> Result<(), MealError> {
        self(event, records);
        Ok(())
    }
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Observers owned by one store instance.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Box<dyn RecordObserver>)>,
}

impl ObserverRegistry {
    pub(crate) fn add(&mut self, observer: Box<dyn RecordObserver>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Notify every observer in subscription order.
    pub(crate) fn notify(&self, event: &MealEvent, records: &[MealRecord]) {
        for (id, observer) in &self.observers {
            if let Err(e) = observer.on_change(event, records) {
                tracing::warn!(subscription = ?id, "meal observer error: {}", e);
            }
        }
    }
}

/// Appends events as JSON lines to a file.
pub struct JournalObserver {
    path: PathBuf,
}

impl JournalObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordObserver for JournalObserver {
    fn on_change(&self, event: &MealEvent, _records: &[MealRecord]) -> Result<(), MealError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| MealError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| MealError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| MealError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct Broken;

    impl RecordObserver for Broken {
        fn on_change(&self, _: &MealEvent, _: &[MealRecord]) -> Result<(), MealError> {
            Err(MealError::EmptyDescription)
        }
    }

    #[test]
    fn event_type_names() {
        let record = MealRecord::pending("eggs");
        assert_eq!(MealEvent::created(&record).event_type(), "meal_created");
        assert_eq!(MealEvent::resolved(&record).event_type(), "meal_resolved");
        assert_eq!(MealEvent::failed(record.id).event_type(), "meal_failed");
        assert_eq!(MealEvent::deleted(&record).event_type(), "meal_deleted");
        assert_eq!(MealEvent::deleted(&record).record_id(), record.id);
    }

    #[test]
    fn event_json_is_tagged() {
        let record = MealRecord::pending("eggs");
        let json = serde_json::to_string(&MealEvent::created(&record)).unwrap();
        assert!(json.contains("\"event_type\":\"meal_created\""));
        let restored: MealEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.record_id(), record.id);
    }

    #[test]
    fn registry_notifies_all_and_survives_errors() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::default();

        registry.add(Box::new(Broken));
        let sink = Arc::clone(&seen);
        registry.add(Box::new(move |event: &MealEvent, records: &[MealRecord]| {
            sink.lock().unwrap().push((event.event_type().to_string(), records.len()));
        }));

        let record = MealRecord::pending("rice");
        registry.notify(&MealEvent::created(&record), std::slice::from_ref(&record));

        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[("meal_created".to_string(), 1)]
        );
    }

    #[test]
    fn remove_unsubscribes_only_that_observer() {
        let mut registry = ObserverRegistry::default();
        let first = registry.add(Box::new(|_: &MealEvent, _: &[MealRecord]| {}));
        let second = registry.add(Box::new(|_: &MealEvent, _: &[MealRecord]| {}));
        assert_ne!(first, second);

        assert!(registry.remove(first));
        assert!(!registry.remove(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn journal_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal").join("meals.jsonl");
        let journal = JournalObserver::new(&path);

        let record = MealRecord::pending("pasta");
        journal.on_change(&MealEvent::created(&record), &[]).unwrap();
        journal.on_change(&MealEvent::failed(record.id), &[]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("meal_failed"));
    }
}
