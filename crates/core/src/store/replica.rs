use std::sync::Arc;

use log::warn;

use crate::{error::StorageError, persistence::BackingStore};

/// A named backing store. Every call goes through [Replica::guard], which
/// turns a failure into a warning and an absent result.
pub(crate) struct Replica {
    name: String,
    store: Arc<dyn BackingStore>,
}

impl Replica {
    pub fn new(name: String, store: Arc<dyn BackingStore>) -> Self {
        Self { name, store }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn guard<T>(
        &self,
        operation: &str,
        call: impl FnOnce(&dyn BackingStore) -> Result<T, StorageError>,
    ) -> Option<T> {
        match call(self.store.as_ref()) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{} failed on `{}`: {}", operation, self.name, e);
                None
            }
        }
    }

    /// Reads a key, treating errors and empty strings as absence.
    pub fn read(&self, key: &str) -> Option<String> {
        self.guard("get", |store| store.get(key.to_owned()))
            .flatten()
            .filter(|value| !value.is_empty())
    }

    pub fn write(&self, key: &str, value: &str) {
        self.guard("set", |store| store.set(key.to_owned(), value.to_owned()));
    }

    pub fn delete(&self, key: &str) {
        self.guard("remove", |store| store.remove_entry(key.to_owned()));
    }

    pub fn clear(&self) {
        self.guard("clear", |store| store.clear());
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.guard("keys", |store| store.keys())
            .unwrap_or_default()
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect()
    }
}

impl std::fmt::Debug for Replica {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Replica").field("name", &self.name).finish()
    }
}
