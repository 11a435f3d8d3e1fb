//! Platform backends for persistence and the page location.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        mod web;
        pub use web::{BrowserLocation, LocalStorageStore};
    } else if #[cfg(feature = "native")] {
        mod native;
        pub use native::SqliteStore;
    }
}
