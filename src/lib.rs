//! Seiza - staking explorer UI state
//!
//! This library holds the client-side logic behind the staking screens of a
//! Cardano explorer: screen state that survives reloads and travels in
//! shareable links, pool list filtering and pagination, the pool comparison
//! matrix with its scroll controls, and pool selection export/import.
//!
//! ## Architecture
//!
//! Rendering is left to the front end. Rust produces serializable snapshots
//! and consumes actions:
//! - **Native**: `seiza` CLI over a SQLite store (`--features native`)
//! - **Web**: wasm-bindgen façade over `localStorage` and the address bar
//!   (`--features dom-web`, wasm32 target)

// Storage and URL plumbing (all platforms)
pub mod kv;
pub mod location;
pub mod query;

// URL <-> storage <-> memory synchronization
pub mod sync;

// Timers (debounce, throttle) driven by explicit time
pub mod debounce;

// List helpers
pub mod filters;
pub mod formatters;
pub mod pagination;

// Comparison matrix scrolling and table renderers
pub mod scroll;
pub mod table;

// GraphQL data loading
pub mod loading;

// Pool selection and export/import
pub mod pools;

// Staking screens and DOM actions
pub mod staking;
pub mod ui_action;

pub mod config;

// Platform backends (SQLite on native, localStorage on web)
pub mod platform;

// WASM-facing exports (JS -> Rust) are only built on wasm32.
#[cfg(all(target_arch = "wasm32", feature = "dom-web"))]
pub mod wasm_api;

// Re-export commonly used types
pub use config::Config;
pub use kv::{KvStore, MemoryStore};
pub use location::{Location, MemoryLocation};
pub use staking::{StakingListSync, StakingSession};
pub use sync::{Reconcile, SyncContext, SyncedField};
