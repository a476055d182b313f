use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{error::StorageError, persistence::BackingStore};

/// A backing store that lives as long as the process. Useful as the
/// short-lived tier on platforms without a tab-scoped storage area, and in
/// tests.
#[derive(Default, Debug)]
pub struct MemoryStore(Mutex<BTreeMap<String, String>>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self(Mutex::new(map))
    }

    /// Copy of everything currently held.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.map().clone()
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BackingStore for MemoryStore {
    fn get(&self, key: String) -> Result<Option<String>, StorageError> {
        Ok(self.map().get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> Result<(), StorageError> {
        self.map().insert(key, value);
        Ok(())
    }

    fn remove_entry(&self, key: String) -> Result<(), StorageError> {
        self.map().remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.map().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.map().keys().cloned().collect())
    }
}
