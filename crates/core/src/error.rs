/// Failure reported by a [BackingStore](crate::BackingStore) implementation.
///
/// The session store never hands these to its own callers, they are logged and
/// the operation degrades to memory-only behavior.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum StorageError {
    #[error("Storage quota exceeded - {error}")]
    QuotaExceeded { error: String },
    #[error("Storage unavailable - {error}")]
    Unavailable { error: String },
    #[error("Storage access denied - {error}")]
    SecurityRestricted { error: String },
    #[error("IO Error - {error}")]
    Io { error: String },
    #[error("Serialization Error - {error}")]
    Serialization { error: String },
    #[error("Storage Error - {error}")]
    Other { error: String },
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io {
            error: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            error: value.to_string(),
        }
    }
}

// Raised when a foreign callback implementation throws something other than
// a StorageError.
impl From<uniffi::UnexpectedUniFFICallbackError> for StorageError {
    fn from(value: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::Other {
            error: value.reason,
        }
    }
}
