use models::{AppConfig, Dashboard, Settings, WasteRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use store::{ConfigStore, FileConfigStore, FileRecordStore, RecordStore, Subscription};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub config: Arc<dyn ConfigStore>,
    pub live: Arc<LiveDashboard>,
    pub currency_symbol: String,
    _subscriptions: Arc<Vec<Subscription>>,
}

impl AppState {
    /// Wires the stores to a fresh dashboard cache that is dropped on every change.
    pub fn new(
        records: Arc<dyn RecordStore>,
        config: Arc<dyn ConfigStore>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        let live = Arc::new(LiveDashboard::default());

        let on_records = live.clone();
        let on_config = live.clone();
        let subscriptions = vec![
            records.subscribe(Box::new(move |_: &[WasteRecord]| on_records.invalidate())),
            config.subscribe(Box::new(move |_: &Option<AppConfig>| on_config.invalidate())),
        ];

        Self {
            records,
            config,
            live,
            currency_symbol: currency_symbol.into(),
            _subscriptions: Arc::new(subscriptions),
        }
    }

    /// Opens the file-backed stores under `settings.data_dir`.
    pub async fn open(settings: &Settings) -> store::Result<Self> {
        let records = FileRecordStore::open(&settings.data_dir).await?;
        let config = FileConfigStore::open(&settings.data_dir).await?;
        Ok(Self::new(
            Arc::new(records),
            Arc::new(config),
            settings.currency_symbol.clone(),
        ))
    }
}

/// Last computed dashboard, recomputed on the next request after any record or config change.
#[derive(Default)]
pub struct LiveDashboard {
    generation: AtomicU64,
    cached: RwLock<Option<(u64, Dashboard)>>,
}

impl LiveDashboard {
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!("Dashboard cache invalidated");
    }

    /// Token to pass back to [`LiveDashboard::store`] once a dashboard has been computed.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn get(&self, month: &str) -> Option<Dashboard> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        match cached.as_ref() {
            Some((generation, dashboard))
                if *generation == self.generation() && dashboard.metadata.month == month =>
            {
                Some(dashboard.clone())
            }
            _ => None,
        }
    }

    /// Keeps `dashboard` unless a change arrived since `generation` was read.
    pub fn store(&self, generation: u64, dashboard: &Dashboard) {
        if generation != self.generation() {
            return;
        }
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) =
            Some((generation, dashboard.clone()));
    }
}
