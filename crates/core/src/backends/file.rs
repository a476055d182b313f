use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use log::{debug, warn};

use crate::{error::StorageError, persistence::BackingStore};

type Entries = BTreeMap<String, String>;

/// A durable backing store keeping every entry in a single JSON object on
/// disk. The file is read on each call and replaced atomically on each write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Entries, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("session");
        self.path
            .with_file_name(format!("{}.tmp.{}", name, std::process::id()))
    }

    fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let buffer = serde_json::to_vec(entries)?;
        atomic_write(&self.path, &self.temp_path(), &buffer)?;
        debug!("Wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Applies `change` and writes the result back. A file that no longer
    /// parses is replaced rather than blocking every later write.
    fn update(&self, change: impl FnOnce(&mut Entries)) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.load() {
            Err(StorageError::Serialization { error }) => {
                warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    error
                );
                Entries::new()
            }
            loaded => loaded?,
        };
        change(&mut entries);
        self.save(&entries)
    }
}

/// Writes to a sibling temp file and renames it over `path`, so readers never
/// see a half-written file.
fn atomic_write(path: &Path, temp_path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::write(temp_path, contents).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        e
    })?;
    fs::rename(temp_path, path).map_err(|e| {
        let _ = fs::remove_file(temp_path);
        e
    })
}

impl BackingStore for FileStore {
    fn get(&self, key: String) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(&key))
    }

    fn set(&self, key: String, value: String) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key, value);
        })
    }

    fn remove_entry(&self, key: String) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(&key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.into_keys().collect())
    }
}
