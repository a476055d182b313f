//! Session storage for an auth client, kept in memory and mirrored into any
//! number of persistent backing stores.
//!
//! The store is handed to the auth library as its storage backend. The
//! library decides which keys to read and write; this crate only relays them
//! and makes sure a broken backing store never surfaces as an error.

pub mod backends;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod store;

pub use self::{
    error::StorageError,
    logging::{init_log, set_log_level, LogLevel},
    persistence::BackingStore,
    store::{
        NamedBackingStore, SessionStore, SessionStoreBuilder, SessionStoreConfiguration,
        DEFAULT_PREFIX,
    },
};

uniffi::setup_scaffolding!();
