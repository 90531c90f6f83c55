//! Persistence for waste records and the application config.
//!
//! Both stores keep one JSON document in the data directory, serialise their writes,
//! and publish every successful change to subscribers.

pub mod admin;
pub mod config;
pub mod error;
mod files;
pub mod records;
pub mod subscription;
pub mod validation;

pub use config::{get_or_init, ConfigEdit, ConfigStore, FileConfigStore, CONFIG_FILE};
pub use error::{Result, StoreError};
pub use records::{FileRecordStore, RecordStore, RECORDS_FILE};
pub use subscription::{Listener, Subscribers, Subscription};

use models::{AppConfig, NewWasteRecord, WasteRecord};

/// Checks a submission against the current config before handing it to the record store.
pub async fn submit_record(
    records: &dyn RecordStore,
    config: &AppConfig,
    record: NewWasteRecord,
) -> Result<WasteRecord> {
    let record = validation::normalize_new_record(record, chrono::Local::now().date_naive())?;
    validation::check_against_config(&record, config).inspect_err(|e| {
        tracing::warn!("Rejected waste record: {}", e);
    })?;
    records.insert(record).await
}
