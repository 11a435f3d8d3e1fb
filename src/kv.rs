//! Persistent key-value storage used by synchronized UI state.
//!
//! Values are plain strings. Structured values are JSON-encoded by the caller
//! (see [`save_json`] / [`load_json`]). Backends never fail outwards: a missing
//! key is `None`, and write failures are logged and swallowed.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Origin-scoped string store (browser localStorage, SQLite, or memory).
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store for non-browser contexts and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut items) = self.items.lock() {
            items.remove(key);
        }
    }
}

/// JSON-encode `value` and store it under `key`.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn KvStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(encoded) => store.set(key, &encoded),
        Err(e) => log::warn!("[kv] could not encode value for {key}: {e}"),
    }
}

/// Load and decode the JSON value under `key`.
///
/// Returns `None` when the key is absent or the stored text is not valid JSON
/// for `T` (corrupted storage is treated as absent).
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("[kv] discarding unreadable value for {key}: {e}");
            None
        }
    }
}
