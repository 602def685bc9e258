//! Shared, lock-guarded access to the configuration store.
//!
//! The inbound listener and the outbound send path both read-modify-write the
//! same store. Every operation here takes the one store lock for its whole
//! duration, so parse, serialize, collect and reset never interleave.
//!
//! # Thread Safety
//!
//! `ConfigState` is `Clone`; all clones share the same store.

use super::{
    CONFIG_SYNC_SECTION, ChangedEntry, ConfigStore, LOCAL_RECV_PORT_KEY, REMOTE_RECV_PORT_KEY,
    StoreStats, file, serializer,
};
use crate::error::persistence::PersistenceError;
use crate::events::{BridgeEvent, EventBus};
use crate::settings::Settings;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use log::{error, info};
use tokio::sync::Mutex;

#[derive(Debug)]
struct PersistPaths {
    config: PathBuf,
    backup: PathBuf,
}

#[derive(Clone)]
pub struct ConfigState {
    store: Arc<Mutex<ConfigStore>>,
    paths: Arc<PersistPaths>,
    events: EventBus,
}

impl ConfigState {
    /// Create an empty store persisted at `config_path`, backed up to `backup_path`.
    pub fn new(config_path: PathBuf, backup_path: PathBuf) -> Self {
        Self {
            store: Arc::new(Mutex::new(ConfigStore::new())),
            paths: Arc::new(PersistPaths {
                config: config_path,
                backup: backup_path,
            }),
            events: EventBus::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.config_path.clone(), settings.backup_path.clone())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Replace current with the persisted file's contents, if the file exists.
    ///
    /// The baseline is left alone: a local file is not confirmation from the peer.
    /// Returns whether a file was found.
    pub async fn load_from_file(&self) -> Result<bool, PersistenceError> {
        let mut store = self.store.lock().await;
        match file::read(&self.paths.config) {
            Ok(Some(contents)) => {
                let items = store.load_text(&contents);
                info!(
                    "Config loaded from {}: {} items",
                    self.paths.config.display(),
                    items
                );
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                error!("Config file load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Handle a payload confirmed received from the peer.
    ///
    /// Current is replaced by the parsed payload, the baseline becomes a copy of
    /// it, and the result is written to the persisted file. A failed write is
    /// logged; the in-memory update stands.
    pub async fn apply_received(&self, payload: &str) -> usize {
        let items = {
            let mut store = self.store.lock().await;
            let items = store.load_text(payload);
            store.commit_baseline(SystemTime::now());
            self.persist_locked(&store);
            items
        };

        info!("Received config applied: {} items, baseline updated", items);
        self.events.publish(BridgeEvent::ConfigReceived {
            payload: payload.to_string(),
        });
        items
    }

    /// Discard edits and go back to the last received configuration.
    pub async fn reset(&self) {
        self.store.lock().await.reset();
        info!("Local edits discarded");
    }

    pub async fn set(&self, section: &str, key: &str, value: &str) {
        self.store.lock().await.set(section, key, value);
    }

    /// Write caller-held edits into the store. Returns how many were collected.
    pub async fn collect<I>(&self, edits: I) -> usize
    where
        I: IntoIterator<Item = (String, String, String)>,
    {
        let mut store = self.store.lock().await;
        let mut collected = 0;
        for (section, key, value) in edits {
            store.set(&section, &key, value);
            collected += 1;
        }
        info!("Collected {} edited values", collected);
        collected
    }

    pub async fn get(&self, section: &str, key: &str) -> Option<String> {
        self.store.lock().await.get(section, key).map(str::to_string)
    }

    pub async fn is_changed(&self, section: &str, key: &str, candidate: &str) -> bool {
        self.store.lock().await.is_changed(section, key, candidate)
    }

    pub async fn changed_entries(&self) -> Vec<ChangedEntry> {
        self.store.lock().await.changed_entries()
    }

    pub async fn has_baseline(&self) -> bool {
        self.store.lock().await.has_baseline()
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.lock().await.stats()
    }

    /// Owned copy of the whole store, so callers can render it without holding the lock.
    pub async fn snapshot(&self) -> ConfigStore {
        self.store.lock().await.clone()
    }

    pub async fn wire_text(&self) -> String {
        serializer::to_wire(self.store.lock().await.current())
    }

    pub async fn persisted_text(&self) -> String {
        serializer::to_persisted(self.store.lock().await.current(), SystemTime::now())
    }

    /// Manual save of the current contents.
    pub async fn save(&self) -> Result<(), PersistenceError> {
        let store = self.store.lock().await;
        let text = serializer::to_persisted(store.current(), SystemTime::now());
        file::write_with_backup(&self.paths.config, &self.paths.backup, &text)
            .inspect_err(|e| error!("Config save failed: {}", e))
    }

    /// Stamp the ports actually in use into `CONFIG_SYNC` and return the wire text to send.
    pub async fn prepare_outbound(&self, listen_port: u16, remote_port: u16) -> String {
        let mut store = self.store.lock().await;
        store.set(
            CONFIG_SYNC_SECTION,
            LOCAL_RECV_PORT_KEY,
            listen_port.to_string(),
        );
        store.set(
            CONFIG_SYNC_SECTION,
            REMOTE_RECV_PORT_KEY,
            remote_port.to_string(),
        );
        let text = serializer::to_wire(store.current());
        info!("Config serialized for send: {} bytes", text.len());
        text
    }

    fn persist_locked(&self, store: &ConfigStore) {
        let text = serializer::to_persisted(store.current(), SystemTime::now());
        if let Err(e) = file::write_with_backup(&self.paths.config, &self.paths.backup, &text) {
            error!("Config applied in memory but file write failed: {}", e);
        }
    }
}
