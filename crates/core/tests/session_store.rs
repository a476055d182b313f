use std::sync::Arc;

use pretty_assertions::assert_eq;
use session_store_core::{
    backends::{FileStore, MemoryStore},
    BackingStore, NamedBackingStore, SessionStore, SessionStoreBuilder, StorageError,
    DEFAULT_PREFIX,
};

/// Rejects every call, like a browser with storage disabled.
struct DisabledStore;

impl BackingStore for DisabledStore {
    fn get(&self, _key: String) -> Result<Option<String>, StorageError> {
        Err(disabled())
    }

    fn set(&self, _key: String, _value: String) -> Result<(), StorageError> {
        Err(disabled())
    }

    fn remove_entry(&self, _key: String) -> Result<(), StorageError> {
        Err(disabled())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(disabled())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Err(disabled())
    }
}

/// Accepts reads but throws on every write.
struct ReadOnlyStore(MemoryStore);

impl BackingStore for ReadOnlyStore {
    fn get(&self, key: String) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&self, _key: String, _value: String) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded {
            error: "write rejected".to_string(),
        })
    }

    fn remove_entry(&self, _key: String) -> Result<(), StorageError> {
        Err(disabled())
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(disabled())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.0.keys()
    }
}

fn disabled() -> StorageError {
    StorageError::SecurityRestricted {
        error: "storage is disabled".to_string(),
    }
}

fn init_log() {
    let _ = env_logger::builder()
        .parse_default_env()
        .is_test(true)
        .try_init();
}

fn dual(tab: Arc<dyn BackingStore>, durable: Arc<dyn BackingStore>) -> SessionStore {
    init_log();
    SessionStore::new(
        DEFAULT_PREFIX,
        vec![
            NamedBackingStore::new("sessionStorage", tab),
            NamedBackingStore::new("localStorage", durable),
        ],
    )
}

#[test]
fn set_then_get_with_every_store_broken() {
    let store = dual(Arc::new(DisabledStore), Arc::new(DisabledStore));

    for (k, v) in [("supabase.auth.token", "t"), ("x", ""), ("a b", "ü")] {
        store.set_item(k.into(), v.into());
        assert_eq!(store.get_item(k.into()), Some(v.to_string()));
    }
    assert_eq!(store.length(), 3);
}

#[test]
fn remove_is_idempotent() {
    let store = dual(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));

    store.remove_item("never-written".into());
    assert_eq!(store.get_item("never-written".into()), None);

    store.set_item("k".into(), "v".into());
    store.remove_item("k".into());
    store.remove_item("k".into());
    assert_eq!(store.get_item("k".into()), None);
    assert_eq!(store.length(), 0);
}

#[test]
fn clear_forgets_everything() {
    let tab = Arc::new(MemoryStore::new());
    let durable = Arc::new(MemoryStore::new());
    let store = dual(tab.clone(), durable.clone());

    store.set_item("supabase.auth.token".into(), "t".into());
    store.set_item("supabase.auth.refresh".into(), "r".into());
    store.clear();

    assert_eq!(store.get_item("supabase.auth.token".into()), None);
    assert_eq!(store.get_item("supabase.auth.refresh".into()), None);
    assert!(tab.snapshot().is_empty());
    assert!(durable.snapshot().is_empty());
}

#[test]
fn length_tracks_distinct_keys() {
    let store = dual(Arc::new(DisabledStore), Arc::new(MemoryStore::new()));

    store.set_item("a".into(), "1".into());
    store.set_item("b".into(), "2".into());
    store.set_item("a".into(), "3".into());
    store.set_item("c".into(), "4".into());
    store.remove_item("b".into());

    assert_eq!(store.length(), 2);
    assert_eq!(store.keys(), vec!["a".to_string(), "c".to_string()]);
}

#[test]
fn durable_entries_are_restored_on_construction() {
    let durable = Arc::new(MemoryStore::with_entries([("supabase.auth.token", "abc")]));

    let store = dual(Arc::new(MemoryStore::new()), durable);

    assert_eq!(store.length(), 1);
    assert_eq!(
        store.get_item("supabase.auth.token".into()),
        Some("abc".to_string())
    );
}

#[test]
fn broken_tab_store_does_not_block_durable_write() {
    let tab = Arc::new(ReadOnlyStore(MemoryStore::new()));
    let durable = Arc::new(MemoryStore::new());
    let store = dual(tab, durable.clone());

    store.set_item("supabase.auth.token".into(), "x".into());

    assert_eq!(
        store.get_item("supabase.auth.token".into()),
        Some("x".to_string())
    );
    assert_eq!(
        durable.get("supabase.auth.token".into()).unwrap(),
        Some("x".to_string())
    );
}

#[test]
fn sign_out_sticks_when_a_store_cannot_delete() {
    let tab = Arc::new(ReadOnlyStore(MemoryStore::with_entries([
        ("supabase.auth.token", "old"),
        ("supabase.auth.refresh", "r-old"),
    ])));
    let store = dual(tab.clone(), Arc::new(MemoryStore::new()));
    assert_eq!(store.length(), 2);

    store.remove_item("supabase.auth.token".into());
    assert_eq!(store.get_item("supabase.auth.token".into()), None);

    store.clear();
    assert_eq!(store.get_item("supabase.auth.refresh".into()), None);
    assert_eq!(store.length(), 0);
    assert_eq!(
        tab.get("supabase.auth.refresh".into()).unwrap(),
        Some("r-old".to_string())
    );
}

#[test]
fn key_follows_insertion_order() {
    let store = dual(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));

    store.set_item("a".into(), "1".into());
    store.set_item("b".into(), "2".into());

    assert_eq!(store.key(0), Some("a".to_string()));
    assert_eq!(store.key(1), Some("b".to_string()));
    assert_eq!(store.key(2), None);
}

#[test]
fn file_store_keeps_the_session_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth-session.json");

    {
        let builder = SessionStoreBuilder::new();
        builder.add_backing_store("memory".into(), Box::new(MemoryStore::new()));
        builder.add_backing_store("file".into(), Box::new(FileStore::new(&path)));
        let store = builder.build();
        store.set_item("supabase.auth.token".into(), "persisted".into());
        store.set_item("unrelated".into(), "kept on disk".into());
    }

    let builder = SessionStoreBuilder::new();
    builder.add_backing_store("memory".into(), Box::new(MemoryStore::new()));
    builder.add_backing_store("file".into(), Box::new(FileStore::new(&path)));
    let store = builder.build();

    assert_eq!(store.keys(), vec!["supabase.auth.token".to_string()]);
    assert_eq!(
        store.get_item("supabase.auth.token".into()),
        Some("persisted".to_string())
    );
    // Outside the restore prefix, but still reachable through the fallback read.
    assert_eq!(
        store.get_item("unrelated".into()),
        Some("kept on disk".to_string())
    );
}
