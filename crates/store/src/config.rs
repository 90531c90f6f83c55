use async_trait::async_trait;
use models::{AppConfig, ConfigPatch};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

use crate::admin::merge_patch;
use crate::error::Result;
use crate::files::{read_json, write_json};
use crate::subscription::{Listener, Subscribers, Subscription};

pub const CONFIG_FILE: &str = "app_config.json";

/// Edit applied to the current document (or the default one) under the store's write lock.
pub type ConfigEdit = Box<dyn FnOnce(AppConfig) -> Result<AppConfig> + Send>;

/// Singleton configuration document.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `None` until the document has been written once.
    async fn get(&self) -> Result<Option<AppConfig>>;
    /// Applies `edit`, reconciles sales with branches and stores the result.
    /// Nothing is written when the edit fails.
    async fn update(&self, edit: ConfigEdit) -> Result<AppConfig>;

    /// Merges `patch` over the current document (or the default one) and stores the result.
    async fn upsert(&self, patch: ConfigPatch) -> Result<AppConfig> {
        self.update(Box::new(move |config| merge_patch(config, patch))).await
    }

    /// Registers a listener. It is called at once with the current document and
    /// again after every successful write. The first call runs under the
    /// store's read lock, so it must not write to the store.
    fn subscribe(&self, listener: Listener<Option<AppConfig>>) -> Subscription;
}

/// Returns the stored config, writing the default document first when there is none.
pub async fn get_or_init(store: &dyn ConfigStore) -> Result<AppConfig> {
    match store.get().await? {
        Some(config) => Ok(config),
        None => {
            tracing::info!("No configuration found, initializing defaults");
            store.upsert(ConfigPatch::default()).await
        }
    }
}

/// JSON object file in the data directory.
pub struct FileConfigStore {
    path: PathBuf,
    current: RwLock<Option<AppConfig>>,
    write_lock: Mutex<()>,
    subscribers: Subscribers<Option<AppConfig>>,
}

impl FileConfigStore {
    /// Opens `<data_dir>/app_config.json`. A missing file is not an error.
    pub async fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILE);
        let current = if tokio::fs::try_exists(&path).await? {
            Some(read_json::<AppConfig>(&path).await?)
        } else {
            None
        };

        Ok(Self {
            path,
            current: RwLock::new(current),
            write_lock: Mutex::new(()),
            subscribers: Subscribers::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> Option<AppConfig> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self) -> Result<Option<AppConfig>> {
        Ok(self.snapshot())
    }

    async fn update(&self, edit: ConfigEdit) -> Result<AppConfig> {
        let _guard = self.write_lock.lock().await;
        let base = self.snapshot().unwrap_or_default();
        let next = edit(base)
            .and_then(|edited| merge_patch(edited, ConfigPatch::default()))
            .inspect_err(|e| {
                tracing::warn!("Rejected configuration update: {}", e);
            })?;

        write_json(&self.path, &next).await?;
        let stored = Some(next.clone());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = stored.clone();
        self.subscribers.notify(&stored);

        tracing::info!(
            "Saved configuration: {} categories, {} branches, threshold {}",
            next.categories.len(),
            next.branches.len(),
            next.waste_threshold
        );
        Ok(next)
    }

    fn subscribe(&self, listener: Listener<Option<AppConfig>>) -> Subscription {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        self.subscribers.subscribe_with(listener, &*current)
    }
}
