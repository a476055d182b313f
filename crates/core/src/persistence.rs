use crate::error::StorageError;

/// A persistent key-value area that session entries are mirrored into.
///
/// Implementations wrap a platform storage facility (`sessionStorage` and
/// `localStorage` in a browser, NSUserDefaults or SharedPreferences on mobile,
/// a file on desktop). Any of these calls may fail; the session store treats a
/// failure as "this store is unavailable for this operation" and carries on.
#[uniffi::export(callback_interface)]
pub trait BackingStore: Send + Sync {
    /// Gets the value for the given key, or None if not found
    fn get(&self, key: String) -> Result<Option<String>, StorageError>;

    /// Sets the value for the given key
    fn set(&self, key: String, value: String) -> Result<(), StorageError>;

    /// Removes the entry for the given key
    fn remove_entry(&self, key: String) -> Result<(), StorageError>;

    /// Removes every entry
    fn clear(&self) -> Result<(), StorageError>;

    /// Lists every key currently held
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
