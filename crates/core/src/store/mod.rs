mod config;
mod entries;
mod replica;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use config::*;
use entries::SessionEntries;
use log::{debug, info};
use replica::Replica;

use crate::{
    logging::{init_log, LogLevel},
    persistence::BackingStore,
};

/// A configuration interface for building a [SessionStore].
///
/// Backing stores are consulted in the order they are added, so add the
/// short-lived (tab or process scoped) store before the durable one.
#[derive(uniffi::Object, Default)]
pub struct SessionStoreBuilder {
    config: Mutex<SessionStoreConfiguration>,
}

#[uniffi::export]
impl SessionStoreBuilder {
    #[uniffi::constructor]
    pub fn new() -> Self {
        Self {
            config: Default::default(),
        }
    }

    /// Sets the key prefix scanned for when restoring from the backing stores.
    pub fn set_prefix(&self, prefix: String) {
        self.config().prefix = prefix;
    }

    /// Set the log filter level.
    pub fn set_log_level(&self, level: LogLevel) {
        self.config().log_level = level;
    }

    /// Appends a backing store. Writes are mirrored into every store added here.
    pub fn add_backing_store(&self, name: String, store: Box<dyn BackingStore>) {
        self.add_shared_backing_store(name, store.into());
    }

    /// Builds the store, restoring any persisted session entries.
    pub fn build(&self) -> Arc<SessionStore> {
        let config = self.config().clone();
        init_log(config.log_level);
        Arc::new(SessionStore::new(config.prefix, config.backing_stores))
    }
}

impl SessionStoreBuilder {
    /// Like [SessionStoreBuilder::add_backing_store], for callers that keep
    /// their own handle on the store.
    pub fn add_shared_backing_store(&self, name: impl Into<String>, store: Arc<dyn BackingStore>) {
        self.config()
            .backing_stores
            .push(NamedBackingStore::new(name, store));
    }

    fn config(&self) -> MutexGuard<'_, SessionStoreConfiguration> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStoreBuilder")
            .field("config", &*self.config())
            .finish()
    }
}

/// Session storage held in memory and mirrored into every backing store.
///
/// Reads are answered from memory. Writes land in memory first and are then
/// copied to each backing store independently; a backing store that fails is
/// logged and skipped, so callers never observe an error.
#[derive(uniffi::Object, Debug)]
pub struct SessionStore {
    prefix: String,
    entries: Mutex<SessionEntries>,
    replicas: Vec<Replica>,
}

impl SessionStore {
    /// Creates a store over `backing_stores` (highest read priority first) and
    /// restores every entry whose key starts with `prefix`.
    pub fn new(prefix: impl Into<String>, backing_stores: Vec<NamedBackingStore>) -> Self {
        let replicas = backing_stores
            .into_iter()
            .map(|backing| Replica::new(backing.name, backing.store))
            .collect();
        let store = Self {
            prefix: prefix.into(),
            entries: Mutex::default(),
            replicas,
        };
        store.restore();
        store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, SessionEntries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restore(&self) {
        let mut restored = 0;
        for replica in &self.replicas {
            for key in replica.keys_with_prefix(&self.prefix) {
                if self.entries().contains(&key) {
                    debug!("`{}` already restored, ignoring copy in {}", key, replica.name());
                    continue;
                }
                if let Some(value) = replica.read(&key) {
                    if self.entries().insert_if_absent(key, value) {
                        restored += 1;
                    }
                }
            }
        }
        info!("Restored {} session entries", restored);
    }
}

#[uniffi::export]
impl SessionStore {
    /// Returns the value for `key`, falling back to the backing stores in
    /// priority order when memory doesn't hold it.
    pub fn get_item(&self, key: String) -> Option<String> {
        {
            let entries = self.entries();
            if let Some(value) = entries.get(&key) {
                return Some(value.to_owned());
            }
            if !entries.allows_read_through(&key) {
                return None;
            }
        }

        let (name, value) = self
            .replicas
            .iter()
            .find_map(|replica| replica.read(&key).map(|value| (replica.name(), value)))?;

        // A remove or clear that ran while the backing stores were being read
        // wins over the value found there.
        let mut entries = self.entries();
        if entries.allows_read_through(&key) && entries.insert_if_absent(key.clone(), value) {
            debug!("Loaded `{}` from {}", key, name);
        }
        entries.get(&key).map(str::to_owned)
    }

    pub fn set_item(&self, key: String, value: String) {
        // The lock is released before the backing stores run so a store that
        // reads back through us sees the new value.
        self.entries().insert(key.clone(), value.clone());
        for replica in &self.replicas {
            replica.write(&key, &value);
        }
    }

    pub fn remove_item(&self, key: String) {
        self.entries().remove(&key);
        for replica in &self.replicas {
            replica.delete(&key);
        }
    }

    pub fn clear(&self) {
        self.entries().clear();
        for replica in &self.replicas {
            replica.clear();
        }
    }

    /// The key at `index` in insertion order, if any.
    pub fn key(&self, index: u64) -> Option<String> {
        let index = usize::try_from(index).ok()?;
        self.entries().key(index).map(str::to_owned)
    }

    pub fn length(&self) -> u64 {
        self.entries().len() as u64
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries().keys().to_vec()
    }

    pub fn backing_store_names(&self) -> Vec<String> {
        self.replicas
            .iter()
            .map(|replica| replica.name().to_owned())
            .collect()
    }
}
