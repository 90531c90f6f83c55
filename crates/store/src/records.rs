use async_trait::async_trait;
use chrono::{Local, Utc};
use models::{NewWasteRecord, WasteRecord};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::files::{ensure_json_file, read_json, write_json};
use crate::subscription::{Listener, Subscribers, Subscription};
use crate::validation::normalize_new_record;

pub const RECORDS_FILE: &str = "waste_records.json";

/// Waste record collection. Records are append-only; there is no update.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, newest date first.
    async fn list_all(&self) -> Result<Vec<WasteRecord>>;
    /// Validates and stores a record, assigning its `id` and `createdAt`.
    async fn insert(&self, record: NewWasteRecord) -> Result<WasteRecord>;
    async fn delete(&self, id: &str) -> Result<()>;
    /// Registers a listener. It is called at once with the current records and
    /// again after every successful mutation. The first call runs under the
    /// store's read lock, so it must not write to the store.
    fn subscribe(&self, listener: Listener<[WasteRecord]>) -> Subscription;
}

/// JSON array file in the data directory.
pub struct FileRecordStore {
    path: PathBuf,
    records: RwLock<Vec<WasteRecord>>,
    write_lock: Mutex<()>,
    subscribers: Subscribers<[WasteRecord]>,
}

impl FileRecordStore {
    /// Opens `<data_dir>/waste_records.json`, creating an empty collection if missing.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(RECORDS_FILE);
        ensure_json_file(&path, &Vec::<WasteRecord>::new()).await?;
        let records: Vec<WasteRecord> = read_json(&path).await?;
        tracing::debug!("Loaded {} waste records from {}", records.len(), path.display());

        Ok(Self {
            path,
            records: RwLock::new(records),
            write_lock: Mutex::new(()),
            subscribers: Subscribers::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Vec<WasteRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Writes `next` to disk, then swaps it in and notifies listeners.
    async fn commit(&self, next: Vec<WasteRecord>) -> Result<()> {
        write_json(&self.path, &next).await?;
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = next.clone();
        self.subscribers.notify(&next);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn list_all(&self) -> Result<Vec<WasteRecord>> {
        let mut records = self.snapshot();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    async fn insert(&self, record: NewWasteRecord) -> Result<WasteRecord> {
        let record = normalize_new_record(record, Local::now().date_naive()).inspect_err(|e| {
            tracing::warn!("Rejected waste record: {}", e);
        })?;
        let stored = WasteRecord::from_new(record, uuid::Uuid::new_v4().to_string(), Utc::now());

        let _guard = self.write_lock.lock().await;
        let mut next = self.snapshot();
        next.push(stored.clone());
        self.commit(next).await?;

        tracing::info!(
            "Stored waste record {} ({} / {}, {})",
            stored.id,
            stored.branch,
            stored.category,
            stored.value
        );
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.snapshot();
        let before = next.len();
        next.retain(|r| r.id != id);
        if next.len() == before {
            return Err(StoreError::RecordNotFound(id.to_string()));
        }
        self.commit(next).await?;

        tracing::info!("Deleted waste record {}", id);
        Ok(())
    }

    fn subscribe(&self, listener: Listener<[WasteRecord]>) -> Subscription {
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        self.subscribers.subscribe_with(listener, &records[..])
    }
}
