//! Application composition root.
//!
//! # Responsibility
//! - Build the dispatcher, storage and entry store from one `CoreConfig`.
//! - Run the startup sequence: validate, create data dir, load, ask for
//!   notification permission.
//!
//! # Invariants
//! - The store and the dispatcher are constructed here and nowhere else in
//!   production code; hosts receive them through this struct.
//! - Startup never fails because of snapshot or notification problems; only
//!   invalid configuration is an error.

use crate::config::{ConfigError, CoreConfig};
use crate::notify::center::NotificationCenter;
use crate::notify::dispatcher::NotificationDispatcher;
use crate::service::entry_store::{EntryStore, LoadOutcome};
use crate::storage::FileSnapshotStorage;
use log::info;
use std::fs;
use std::sync::Arc;

pub struct MoodLogApp {
    config: CoreConfig,
    dispatcher: Arc<NotificationDispatcher>,
    store: EntryStore<FileSnapshotStorage>,
}

impl MoodLogApp {
    /// Opens the app core and returns it with the startup load outcome.
    ///
    /// # Errors
    /// - Returns an error when `config` is invalid or the data directory
    ///   cannot be created.
    pub fn open(
        config: CoreConfig,
        center: Arc<dyn NotificationCenter>,
    ) -> Result<(Self, LoadOutcome), ConfigError> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir).map_err(|source| ConfigError::CreateDataDir {
            path: config.data_dir.clone(),
            source,
        })?;

        let dispatcher = Arc::new(NotificationDispatcher::new(
            center,
            config.notification.clone(),
        ));
        let storage = FileSnapshotStorage::new(config.snapshot_path());
        let mut store = EntryStore::new(storage, Arc::clone(&dispatcher));
        let outcome = store.load();

        // Permission answer is logged by the dispatcher.
        let _ = dispatcher.request_permission();

        info!(
            "event=app_open module=app status=ok data_dir={} entries={}",
            config.data_dir.display(),
            store.len()
        );

        Ok((
            Self {
                config,
                dispatcher,
                store,
            },
            outcome,
        ))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    pub fn store(&self) -> &EntryStore<FileSnapshotStorage> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntryStore<FileSnapshotStorage> {
        &mut self.store
    }
}
