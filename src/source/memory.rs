//! In-memory record source
//!
//! Holds a collection in process. Used for tests and offline previews of a
//! screen; mutations behave like the admin API (approve/reject set `status`,
//! reject stores `rejection_reason`).

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{check_id, check_reason, RecordMutations, RecordSource, SourceError};
use crate::models::Record;

/// Thread-safe in-process collection
#[derive(Debug, Default)]
pub struct MemoryRecordSource {
    records: Mutex<Vec<Record>>,
    next_id: AtomicU64,
    fetches: AtomicU64,
}

impl MemoryRecordSource {
    /// Create a source seeded with `records`
    pub fn new(records: Vec<Record>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| r.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            records: Mutex::new(records),
            next_id: AtomicU64::new(next_id),
            fetches: AtomicU64::new(0),
        }
    }

    /// Snapshot of the stored records
    pub fn records(&self) -> Vec<Record> {
        self.lock().clone()
    }

    /// Number of `fetch_records` calls served
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn modify(&self, id: &str, f: impl FnOnce(&mut Record)) -> Result<(), SourceError> {
        check_id(id)?;
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id().as_deref() == Some(id))
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        f(record);
        Ok(())
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn fetch_records(&self) -> Result<Vec<Record>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.records())
    }
}

#[async_trait]
impl RecordMutations for MemoryRecordSource {
    async fn create(&self, record: &Record) -> Result<(), SourceError> {
        let mut record = record.clone();
        if record.id().is_none() {
            record.insert("id", self.next_id.fetch_add(1, Ordering::SeqCst));
        }
        self.lock().push(record);
        Ok(())
    }

    async fn update(&self, id: &str, record: &Record) -> Result<(), SourceError> {
        self.modify(id, |stored| {
            for (name, value) in record.as_map() {
                if name != "id" {
                    stored.insert(name.clone(), value.clone());
                }
            }
        })
    }

    async fn delete(&self, id: &str) -> Result<(), SourceError> {
        check_id(id)?;
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| r.id().as_deref() != Some(id));
        if records.len() == before {
            return Err(SourceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn approve(&self, id: &str) -> Result<(), SourceError> {
        self.modify(id, |record| {
            record.insert("status", "approved");
        })
    }

    async fn reject(&self, id: &str, reason: &str) -> Result<(), SourceError> {
        check_reason(reason)?;
        self.modify(id, |record| {
            record.insert("status", "rejected");
            record.insert("rejection_reason", reason.trim());
        })
    }
}
