// logger.rs: The log-a-meal workflow.
//
// 1. Create a pending record (visible to observers at once).
// 2. Await the analysis provider without holding the store lock.
// 3. Resolve or fail the record by id.
//
// Several meals may be in flight at the same time; each settlement only
// touches its own record. If the record was deleted in the meantime, the
// result is dropped.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use nt_meals::{MealError, MealRecord, MealStatus, NutrientPayload, RecordStore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AssistError;
use crate::provider::MealAnalyzer;

/// The record store shared between the UI side and in-flight settlements.
pub type SharedStore = Arc<Mutex<RecordStore>>;

pub fn shared_store(store: RecordStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

pub(crate) fn lock_store(store: &SharedStore) -> Result<MutexGuard<'_, RecordStore>, AssistError> {
    store
        .lock()
        .map_err(|_| AssistError::LockPoisoned("meal store"))
}

/// How a logged meal ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Analysis succeeded and the payload was merged.
    Completed(MealRecord),
    /// Analysis failed; the record is kept with a zeroed payload.
    Failed { record: MealRecord, reason: String },
    /// The record was deleted before analysis finished.
    Dropped { record_id: Uuid },
}

impl Settlement {
    pub fn record_id(&self) -> Uuid {
        match self {
            Settlement::Completed(record) | Settlement::Failed { record, .. } => record.id,
            Settlement::Dropped { record_id } => *record_id,
        }
    }

    pub fn record(&self) -> Option<&MealRecord> {
        match self {
            Settlement::Completed(record) | Settlement::Failed { record, .. } => Some(record),
            Settlement::Dropped { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct MealLogger {
    store: SharedStore,
    analyzer: Arc<dyn MealAnalyzer>,
    timeout: Option<Duration>,
}

impl MealLogger {
    pub fn new(store: SharedStore, analyzer: Arc<dyn MealAnalyzer>) -> Self {
        Self {
            store,
            analyzer,
            timeout: None,
        }
    }

    /// Fail the record when the provider takes longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Log a meal and wait for it to settle.
    pub async fn log(&self, description: &str) -> Result<Settlement, AssistError> {
        let record = self.begin(description)?;
        self.settle(record).await
    }

    /// Log a meal and settle it in the background.
    ///
    /// Returns the pending record straight away together with a handle to
    /// the settlement task. Must be called inside a tokio runtime.
    pub fn spawn(
        &self,
        description: &str,
    ) -> Result<(MealRecord, JoinHandle<Result<Settlement, AssistError>>), AssistError> {
        let record = self.begin(description)?;
        let logger = self.clone();
        let pending = record.clone();
        let handle = tokio::spawn(async move { logger.settle(pending).await });
        Ok((record, handle))
    }

    fn begin(&self, description: &str) -> Result<MealRecord, AssistError> {
        let mut store = lock_store(&self.store)?;
        match store.create(description) {
            Ok(record) => Ok(record),
            Err(MealError::NotPersisted { record_id, source }) => {
                tracing::warn!(%record_id, error = %source, "pending meal not persisted; analyzing anyway");
                store
                    .get(record_id)
                    .cloned()
                    .ok_or(AssistError::Meal(MealError::NotPersisted { record_id, source }))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn settle(&self, record: MealRecord) -> Result<Settlement, AssistError> {
        let analysis = self.analyze(&record.description).await;

        // The record must still leave `pending`, even after a panic elsewhere
        // poisoned the lock. Store mutations finish before they notify, so
        // the guarded state is consistent.
        let mut store = self.store.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(record_id = %record.id, "meal store lock poisoned; settling anyway");
            poisoned.into_inner()
        });
        let mut reason = None;
        let outcome = match analysis {
            Ok(payload) => store.resolve(record.id, payload),
            Err(e) => {
                tracing::warn!(record_id = %record.id, error = %e, "meal analysis failed");
                reason = Some(e.to_string());
                store.fail(record.id)
            }
        };

        let settled = match outcome {
            Ok(found) => found,
            Err(MealError::NotPersisted { record_id, source }) => {
                tracing::warn!(%record_id, error = %source, "meal settled but not persisted");
                store.get(record_id).cloned()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(match settled {
            None => {
                tracing::warn!(record_id = %record.id, "analysis arrived for a deleted meal; dropped");
                Settlement::Dropped {
                    record_id: record.id,
                }
            }
            Some(record) if record.status == MealStatus::Complete => Settlement::Completed(record),
            Some(record) => Settlement::Failed {
                record,
                reason: reason.unwrap_or_default(),
            },
        })
    }

    async fn analyze(&self, description: &str) -> Result<NutrientPayload, AssistError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.analyzer.analyze(description))
                .await
                .map_err(|_| AssistError::AnalysisTimeout {
                    secs: limit.as_secs(),
                })?,
            None => self.analyzer.analyze(description).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct Fixed(NutrientPayload);

    #[async_trait]
    impl MealAnalyzer for Fixed {
        async fn analyze(&self, _description: &str) -> Result<NutrientPayload, AssistError> {
            Ok(self.0.clone())
        }
    }

    struct Rejecting;

    #[async_trait]
    impl MealAnalyzer for Rejecting {
        async fn analyze(&self, _description: &str) -> Result<NutrientPayload, AssistError> {
            Err(AssistError::Analysis("quota exceeded".into()))
        }
    }

    /// Blocks until released, so tests can act while analysis is in flight.
    struct Gated {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl MealAnalyzer for Gated {
        async fn analyze(&self, _description: &str) -> Result<NutrientPayload, AssistError> {
            self.gate.notified().await;
            Ok(NutrientPayload::macros(300.0, 20.0, 30.0, 10.0))
        }
    }

    fn logger(analyzer: impl MealAnalyzer + 'static) -> MealLogger {
        MealLogger::new(shared_store(RecordStore::in_memory()), Arc::new(analyzer))
    }

    #[tokio::test]
    async fn log_completes_record() {
        let logger = logger(Fixed(NutrientPayload::macros(650.0, 35.0, 70.0, 22.0)));
        let settlement = logger.log("chicken and rice").await.unwrap();

        let Settlement::Completed(record) = settlement else {
            panic!("expected completion");
        };
        assert_eq!(record.nutrients.calories, 650.0);
        let store = logger.store().lock().unwrap();
        assert_eq!(store.get(record.id).unwrap().status, MealStatus::Complete);
    }

    #[tokio::test]
    async fn rejected_analysis_fails_record() {
        let logger = logger(Rejecting);
        let settlement = logger.log("mystery stew").await.unwrap();

        match settlement {
            Settlement::Failed { record, reason } => {
                assert_eq!(record.status, MealStatus::Failed);
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn blank_description_creates_nothing() {
        let logger = logger(Rejecting);
        assert!(matches!(
            logger.log("  ").await,
            Err(AssistError::Meal(MealError::EmptyDescription))
        ));
        assert!(logger.store().lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spawn_returns_pending_record_first() {
        let gate = Arc::new(Notify::new());
        let logger = logger(Gated {
            gate: Arc::clone(&gate),
        });

        let (pending, handle) = logger.spawn("pasta").unwrap();
        assert_eq!(pending.status, MealStatus::Pending);
        assert_eq!(
            logger.store().lock().unwrap().get(pending.id).unwrap().status,
            MealStatus::Pending
        );

        gate.notify_one();
        let settlement = handle.await.unwrap().unwrap();
        assert_eq!(settlement.record_id(), pending.id);
        assert!(matches!(settlement, Settlement::Completed(_)));
    }

    #[tokio::test]
    async fn delete_during_analysis_drops_result() {
        let gate = Arc::new(Notify::new());
        let logger = logger(Gated {
            gate: Arc::clone(&gate),
        });

        let (pending, handle) = logger.spawn("burrito").unwrap();
        assert!(logger.store().lock().unwrap().delete(pending.id).unwrap());

        gate.notify_one();
        let settlement = handle.await.unwrap().unwrap();
        assert_eq!(
            settlement,
            Settlement::Dropped {
                record_id: pending.id
            }
        );
        assert!(logger.store().lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn settles_after_lock_was_poisoned() {
        let gate = Arc::new(Notify::new());
        let logger = logger(Gated {
            gate: Arc::clone(&gate),
        });
        let (pending, handle) = logger.spawn("stir fry").unwrap();

        let store = Arc::clone(logger.store());
        let panicked = std::thread::spawn(move || {
            let _guard = store.lock().unwrap();
            panic!("observer blew up");
        })
        .join();
        assert!(panicked.is_err());
        assert!(logger.store().is_poisoned());

        gate.notify_one();
        let settlement = handle.await.unwrap().unwrap();
        assert!(matches!(settlement, Settlement::Completed(_)));

        let store = logger.store().lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(store.get(pending.id).unwrap().status, MealStatus::Complete);
    }

    #[tokio::test]
    async fn timeout_fails_record() {
        let logger = logger(Gated {
            gate: Arc::new(Notify::new()),
        })
        .with_timeout(Duration::from_millis(20));

        match logger.log("never answered").await.unwrap() {
            Settlement::Failed { record, reason } => {
                assert_eq!(record.status, MealStatus::Failed);
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
