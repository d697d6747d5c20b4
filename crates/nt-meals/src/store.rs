// store.rs: RecordStore, the canonical meal collection.
//
// The whole collection is persisted as one JSON document under the
// `nutritrack-meals` key:
//
//   {"version": 1, "meals": [ {record}, ... ]}
//
// Every mutation follows the same order: apply in memory, write the full
// collection, then notify observers. A failed write does not roll back the
// in-memory change; observers are still notified and the caller gets
// `MealError::NotPersisted`.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use nt_storage::{DurableSlot, MemorySlots};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MealError;
use crate::events::{MealEvent, ObserverRegistry, RecordObserver, SubscriptionId};
use crate::record::{MealRecord, MealStatus, NutrientPayload};

/// Slot key for the persisted meal collection.
pub const MEAL_STORE_KEY: &str = "nutritrack-meals";

const DOCUMENT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct MealDocument {
    version: u32,
    meals: Vec<MealRecord>,
}

/// Owns the meal records, their durable mirror, and the store's observers.
///
/// Records are kept newest first. Each store instance has its own observer
/// list; create one per application and share it.
pub struct RecordStore {
    slot: Box<dyn DurableSlot>,
    records: Vec<MealRecord>,
    observers: ObserverRegistry,
}

impl RecordStore {
    /// Open the store over a durable slot, loading any saved collection.
    ///
    /// A missing, unreadable or corrupt document yields an empty store.
    pub fn open(slot: Box<dyn DurableSlot>) -> Self {
        let records = load_records(slot.as_ref());
        tracing::debug!(count = records.len(), "meal store opened");
        Self {
            slot,
            records,
            observers: ObserverRegistry::default(),
        }
    }

    /// A store backed by a fresh in-memory slot.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemorySlots::new()))
    }

    /// Log a meal. The record is pending with a zeroed payload and is
    /// visible to `list()` and observers before this returns.
    pub fn create(&mut self, description: impl Into<String>) -> Result<MealRecord, MealError> {
        self.create_at(description, Utc::now())
    }

    /// Log a meal with an explicit date (backfilling or imports).
    pub fn create_at(
        &mut self,
        description: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Result<MealRecord, MealError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(MealError::EmptyDescription);
        }

        let mut record = MealRecord::pending_at(description.trim(), date);
        while self.contains(record.id) {
            record.id = Uuid::new_v4();
        }

        self.records.insert(0, record.clone());
        self.sort();
        tracing::debug!(record_id = %record.id, "meal created");

        self.commit(MealEvent::created(&record))?;
        Ok(record)
    }

    /// Settle a pending record as complete with the provider's payload.
    ///
    /// Returns `Ok(None)` when the record no longer exists (deleted while
    /// its analysis was in flight). Nothing is written in that case.
    pub fn resolve(
        &mut self,
        id: Uuid,
        payload: NutrientPayload,
    ) -> Result<Option<MealRecord>, MealError> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(record_id = %id, "resolve for unknown meal ignored");
            return Ok(None);
        };
        record.complete(payload)?;
        let record = record.clone();
        tracing::debug!(record_id = %id, calories = record.nutrients.calories, "meal resolved");

        self.commit(MealEvent::resolved(&record))?;
        Ok(Some(record))
    }

    /// Settle a pending record as failed. Same not-found handling as `resolve`.
    pub fn fail(&mut self, id: Uuid) -> Result<Option<MealRecord>, MealError> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(record_id = %id, "fail for unknown meal ignored");
            return Ok(None);
        };
        record.mark_failed()?;
        let record = record.clone();
        tracing::debug!(record_id = %id, "meal analysis failed");

        self.commit(MealEvent::failed(id))?;
        Ok(Some(record))
    }

    /// Remove a record in any state. Returns whether it existed.
    pub fn delete(&mut self, id: Uuid) -> Result<bool, MealError> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return Ok(false);
        };
        let removed = self.records.remove(index);
        tracing::debug!(record_id = %id, status = %removed.status, "meal deleted");

        self.commit(MealEvent::deleted(&removed))?;
        Ok(true)
    }

    /// All records, newest first.
    pub fn list(&self) -> Vec<MealRecord> {
        self.records.clone()
    }

    /// Borrowed view of the records, newest first.
    pub fn records(&self) -> &[MealRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&MealRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with the given status, newest first.
    pub fn list_by_status(&self, status: MealStatus) -> Vec<MealRecord> {
        self.records
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect()
    }

    /// Records logged on `day` in the given time zone, newest first.
    pub fn for_day<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<MealRecord> {
        self.records
            .iter()
            .filter(|r| r.date.with_timezone(tz).date_naive() == day)
            .cloned()
            .collect()
    }

    /// Register an observer. It is called after every mutation with the
    /// event and the full collection.
    pub fn subscribe(&mut self, observer: impl RecordObserver + 'static) -> SubscriptionId {
        self.observers.add(Box::new(observer))
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.observers.remove(subscription)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Persist, then notify. The persistence result is returned after
    /// observers have seen the change.
    fn commit(&mut self, event: MealEvent) -> Result<(), MealError> {
        let persisted = self.persist(event.record_id());
        if let Err(e) = &persisted {
            tracing::warn!(record_id = %event.record_id(), "meal store write failed: {}", e);
        }
        self.observers.notify(&event, &self.records);
        persisted
    }

    fn persist(&mut self, record_id: Uuid) -> Result<(), MealError> {
        let doc = MealDocument {
            version: DOCUMENT_VERSION,
            meals: self.records.clone(),
        };
        let json = serde_json::to_string(&doc)?;
        self.slot
            .write(MEAL_STORE_KEY, &json)
            .map_err(|source| MealError::NotPersisted { record_id, source })
    }

    // Stable sort, so a record inserted at the head stays ahead of any
    // record with the same timestamp.
    fn sort(&mut self) {
        self.records.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

fn load_records(slot: &dyn DurableSlot) -> Vec<MealRecord> {
    let blob = match slot.read(MEAL_STORE_KEY) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read meal store; starting empty");
            return Vec::new();
        }
    };

    let doc = match serde_json::from_str::<MealDocument>(&blob) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "discarding corrupt meal store document");
            return Vec::new();
        }
    };
    if doc.version != DOCUMENT_VERSION {
        tracing::warn!(version = doc.version, "unexpected meal store version; loading anyway");
    }

    let mut seen = HashSet::new();
    let mut records: Vec<MealRecord> = doc
        .meals
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.id);
            if !fresh {
                tracing::warn!(record_id = %r.id, "dropping duplicate meal id");
            }
            fresh
        })
        .collect();
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}
