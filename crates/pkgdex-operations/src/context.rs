use std::{
    path::PathBuf,
    sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use once_cell::sync::OnceCell;
use pkgdex_config::config::Config;
use pkgdex_db::{PackageStore, STORE_FILE_NAME};
use pkgdex_dl::fetch::{FetcherHandle, HttpFetcher};
use pkgdex_events::{EventSink, EventSinkHandle, Failure, FailureKind};
use pkgdex_registry::MetadataSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{OperationError, OperationResult};

/// Shared state for all operations: configuration, event sink, HTTP fetcher
/// and the lazily opened package store.
pub struct PkgdexContext {
    config: RwLock<Config>,
    config_path: Option<PathBuf>,
    events: EventSinkHandle,
    fetcher: FetcherHandle,
    store: OnceCell<PackageStore>,
    current_sync: Mutex<CancellationToken>,
    sync_gate: tokio::sync::Mutex<()>,
}

impl PkgdexContext {
    pub fn new(config: Config, events: EventSinkHandle) -> Self {
        trace!("creating new context");
        Self {
            config: RwLock::new(config),
            config_path: None,
            events,
            fetcher: Arc::new(HttpFetcher),
            store: OnceCell::new(),
            current_sync: Mutex::new(CancellationToken::new()),
            sync_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// File that repository changes are saved to.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    pub fn with_fetcher(mut self, fetcher: FetcherHandle) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Uses `store` instead of opening the configured database file.
    pub fn with_store(self, store: PackageStore) -> Self {
        let _ = self.store.set(store);
        self
    }

    pub fn config(&self) -> RwLockReadGuard<'_, Config> {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn config_mut(&self) -> RwLockWriteGuard<'_, Config> {
        self.config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }

    pub fn events(&self) -> &EventSinkHandle {
        &self.events
    }

    pub fn fetcher(&self) -> &FetcherHandle {
        &self.fetcher
    }

    pub fn metadata_source(&self) -> MetadataSource {
        let config = self.config();
        MetadataSource::new(config.raw_content_base(), config.default_branch())
    }

    /// The package store, opened on first use.
    ///
    /// An open failure is reported as [`FailureKind::StoreUnavailable`] and
    /// retried on the next call.
    pub fn store(&self) -> OperationResult<&PackageStore> {
        self.store.get_or_try_init(|| {
            let path = self
                .config()
                .get_db_path()
                .map(|dir| dir.join(STORE_FILE_NAME))
                .map_err(|err| self.store_unavailable("<unresolved db_path>", err.to_string()))?;

            debug!(path = %path.display(), "opening package store");
            PackageStore::open(&path)
                .map_err(|err| self.store_unavailable(&path.display().to_string(), err.to_string()))
        })
    }

    fn store_unavailable(&self, path: &str, reason: String) -> OperationError {
        self.events.report(Failure::new(
            FailureKind::StoreUnavailable,
            path,
            reason.clone(),
        ));
        OperationError::StoreUnavailable {
            path: path.to_string(),
            reason,
        }
    }

    /// Cancels the running sync pass, if any.
    pub fn cancel_sync(&self) {
        if let Ok(token) = self.current_sync.lock() {
            token.cancel();
        }
    }

    /// Supersedes the running sync pass and returns the token for a new one.
    pub(crate) fn begin_sync(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let mut current = self
            .current_sync
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.cancel();
        *current = token.clone();
        token
    }

    pub(crate) async fn acquire_sync_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.sync_gate.lock().await
    }
}

#[cfg(test)]
mod tests {
    use pkgdex_events::CollectorSink;

    use super::*;

    #[test]
    fn test_begin_sync_cancels_previous() {
        let ctx = PkgdexContext::new(Config::default_config(), Arc::new(CollectorSink::default()));

        let first = ctx.begin_sync();
        assert!(!first.is_cancelled());

        let second = ctx.begin_sync();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        ctx.cancel_sync();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_store_is_opened_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default_config();
        config.db_path = Some(dir.path().join("db").display().to_string());

        let ctx = PkgdexContext::new(config, Arc::new(CollectorSink::default()));
        let first = ctx.store().unwrap() as *const PackageStore;
        let second = ctx.store().unwrap() as *const PackageStore;

        assert_eq!(first, second);
        assert!(dir.path().join("db").join(STORE_FILE_NAME).exists());
    }

    #[test]
    fn test_metadata_source_from_config() {
        let mut config = Config::default_config();
        config.raw_content_base = Some("http://mirror/".to_string());
        config.default_branch = Some("dev".to_string());

        let ctx = PkgdexContext::new(config, Arc::new(CollectorSink::default()));
        assert_eq!(ctx.metadata_source(), MetadataSource::new("http://mirror", "dev"));
    }
}
