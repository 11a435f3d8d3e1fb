//! Browser backends: `window.localStorage` and `history.replaceState`.

use crate::kv::KvStore;
use crate::location::Location;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// `KvStore` over `window.localStorage`. Quota or privacy-mode failures are
/// logged and otherwise ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageStore;

impl KvStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        match local_storage() {
            Some(ls) => {
                if ls.set_item(key, value).is_err() {
                    log::warn!("[store] localStorage write failed for {key}");
                }
            }
            None => log::warn!("[store] localStorage unavailable"),
        }
    }

    fn remove(&self, key: &str) {
        if let Some(ls) = local_storage() {
            let _ = ls.remove_item(key);
        }
    }
}

/// The page URL. Query updates replace the current history entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserLocation;

impl Location for BrowserLocation {
    fn search(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .map(|s| s.trim_start_matches('?').to_string())
            .unwrap_or_default()
    }

    fn replace_search(&self, search: &str) {
        let Some(win) = web_sys::window() else { return };
        let location = win.location();
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let hash = location.hash().unwrap_or_default();
        let search = search.trim_start_matches('?');
        let url = if search.is_empty() {
            format!("{path}{hash}")
        } else {
            format!("{path}?{search}{hash}")
        };
        if let Ok(hist) = win.history() {
            if hist
                .replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url))
                .is_err()
            {
                log::warn!("[location] replaceState failed");
            }
        }
    }
}
