mod web_storage;

use std::sync::Arc;

use log::debug;
use serde::Deserialize;
use session_store_core::{set_log_level, LogLevel, SessionStore, SessionStoreBuilder};
use wasm_bindgen::prelude::*;

pub use web_storage::{StorageArea, WebStorage};

/// Options accepted by the `AuthSessionStorage` constructor.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct StorageOptions {
    prefix: Option<String>,
    #[serde(default)]
    log_level: LogLevel,
}

/// Storage object handed to the auth client, e.g.
/// `createClient(url, key, { auth: { storage: new AuthSessionStorage() } })`.
///
/// Entries are kept in memory and mirrored into `sessionStorage` and
/// `localStorage`. Neither storage area failing ever throws into JavaScript.
#[wasm_bindgen]
pub struct AuthSessionStorage {
    inner: Arc<SessionStore>,
}

#[wasm_bindgen]
impl AuthSessionStorage {
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<AuthSessionStorage, JsError> {
        console_error_panic_hook::set_once();
        let options: StorageOptions = if options.is_undefined() || options.is_null() {
            StorageOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options)?
        };
        let _ = console_log::init_with_level(log::Level::Trace);
        debug!("New session storage: {options:?}");

        let builder = SessionStoreBuilder::new();
        if let Some(prefix) = options.prefix {
            builder.set_prefix(prefix);
        }
        builder.set_log_level(options.log_level);
        builder.add_shared_backing_store(
            StorageArea::Session.property(),
            Arc::new(WebStorage::new(StorageArea::Session)),
        );
        builder.add_shared_backing_store(
            StorageArea::Local.property(),
            Arc::new(WebStorage::new(StorageArea::Local)),
        );

        let inner = builder.build();
        // The logger is installed once per page; the level follows the latest
        // instance.
        set_log_level(options.log_level);

        Ok(AuthSessionStorage { inner })
    }

    /// Returns the stored string, or `null`.
    #[wasm_bindgen(js_name = "getItem")]
    pub fn get_item(&self, key: String) -> JsValue {
        self.inner
            .get_item(key)
            .map(JsValue::from)
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = "setItem")]
    pub fn set_item(&self, key: String, value: String) {
        self.inner.set_item(key, value);
    }

    #[wasm_bindgen(js_name = "removeItem")]
    pub fn remove_item(&self, key: String) {
        self.inner.remove_item(key);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    pub fn key(&self, index: u32) -> JsValue {
        self.inner
            .key(index.into())
            .map(JsValue::from)
            .unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        u32::try_from(self.inner.length()).unwrap_or(u32::MAX)
    }
}
