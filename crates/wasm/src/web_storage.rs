use js_sys::Reflect;
use session_store_core::{BackingStore, StorageError};
use wasm_bindgen::{prelude::*, JsCast};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "Storage")]
    type Storage;

    #[wasm_bindgen(method, catch, js_name = getItem)]
    fn get_item(this: &Storage, key: &str) -> Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setItem)]
    fn set_item(this: &Storage, key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = removeItem)]
    fn remove_item(this: &Storage, key: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn clear(this: &Storage) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn key(this: &Storage, index: u32) -> Result<Option<String>, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn length(this: &Storage) -> u32;
}

/// Which of the two Web Storage areas to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    /// `window.sessionStorage`, scoped to the tab.
    Session,
    /// `window.localStorage`, survives browser restarts.
    Local,
}

impl StorageArea {
    pub fn property(self) -> &'static str {
        match self {
            StorageArea::Session => "sessionStorage",
            StorageArea::Local => "localStorage",
        }
    }
}

/// A [BackingStore] over one Web Storage area.
///
/// Merely touching `window.localStorage` throws in some browsers (storage
/// disabled, sandboxed iframes), so the area is looked up on every call
/// instead of being captured once.
#[derive(Debug, Clone, Copy)]
pub struct WebStorage {
    area: StorageArea,
}

impl WebStorage {
    pub fn new(area: StorageArea) -> Self {
        Self { area }
    }

    fn storage(&self) -> Result<Storage, StorageError> {
        let property = self.area.property();
        let value =
            Reflect::get(&js_sys::global(), &JsValue::from_str(property)).map_err(storage_error)?;
        if value.is_undefined() || value.is_null() {
            return Err(StorageError::Unavailable {
                error: format!("{property} is not available"),
            });
        }
        Ok(value.unchecked_into())
    }
}

impl BackingStore for WebStorage {
    fn get(&self, key: String) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(&key).map_err(storage_error)
    }

    fn set(&self, key: String, value: String) -> Result<(), StorageError> {
        self.storage()?.set_item(&key, &value).map_err(storage_error)
    }

    fn remove_entry(&self, key: String) -> Result<(), StorageError> {
        self.storage()?.remove_item(&key).map_err(storage_error)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage()?.clear().map_err(storage_error)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let storage = self.storage()?;
        (0..storage.length())
            .filter_map(|index| storage.key(index).transpose())
            .collect::<Result<Vec<_>, _>>()
            .map_err(storage_error)
    }
}

fn js_string_property(value: &JsValue, name: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .and_then(|property| property.as_string())
}

/// Classifies a thrown DOMException by its `name`.
fn storage_error(value: JsValue) -> StorageError {
    let name = js_string_property(&value, "name").unwrap_or_default();
    let error = js_string_property(&value, "message").unwrap_or_else(|| format!("{value:?}"));
    match name.as_str() {
        "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => {
            StorageError::QuotaExceeded { error }
        }
        "SecurityError" => StorageError::SecurityRestricted { error },
        "InvalidStateError" | "NotSupportedError" => StorageError::Unavailable { error },
        _ => StorageError::Other { error },
    }
}
