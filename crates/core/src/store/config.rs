use std::sync::Arc;

use crate::{logging::LogLevel, persistence::BackingStore};

/// Key prefix the auth library uses for everything it persists.
pub const DEFAULT_PREFIX: &str = "supabase.auth";

/// A backing store together with the name it is logged under.
#[derive(Clone)]
pub struct NamedBackingStore {
    pub name: String,
    pub store: Arc<dyn BackingStore>,
}

impl NamedBackingStore {
    pub fn new(name: impl Into<String>, store: Arc<dyn BackingStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }
}

impl std::fmt::Debug for NamedBackingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedBackingStore")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct SessionStoreConfiguration {
    /// Keys starting with this prefix are restored from the backing stores on
    /// construction. Defaults to [DEFAULT_PREFIX].
    pub prefix: String,
    /// Initial log level - defaults to [LogLevel::Info]
    pub log_level: LogLevel,
    /// Backing stores in read priority order. Restoring and read-through
    /// fallback both prefer earlier entries.
    pub backing_stores: Vec<NamedBackingStore>,
}

impl Default for SessionStoreConfiguration {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            log_level: LogLevel::default(),
            backing_stores: Vec::new(),
        }
    }
}
