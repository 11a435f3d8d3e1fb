//! JS -> Rust surface for the DOM front end.
//!
//! The page owns one [`WasmStaking`]. It reads JSON snapshots, sends JSON
//! actions back, and re-renders; persistence goes to `localStorage` and the
//! address bar.

#![cfg(all(target_arch = "wasm32", feature = "dom-web"))]

use crate::config::Config;
use crate::loading::{GraphqlClient, QueryClient};
use crate::platform::{BrowserLocation, LocalStorageStore};
use crate::staking::{StakingSession, POOL_LIST_QUERY};
use crate::sync::{Reconcile, SyncContext};
use crate::ui_action::{self, UiAction};
use crate::location::Location;
use chrono::Utc;
use gloo_timers::callback::Interval;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_time::Instant;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize snapshot: {e}");
        "{}".to_string()
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile {
    file_name: String,
    contents: String,
}

#[wasm_bindgen]
pub struct WasmStaking {
    session: Rc<RefCell<StakingSession>>,
    client: Rc<GraphqlClient>,
    location: Arc<BrowserLocation>,
    /// Runs only while the session has timers to advance.
    ticker: Rc<RefCell<Option<Interval>>>,
    interval_ms: u32,
}

/// Start ticking `session` unless already running.
fn wake(session: &Rc<RefCell<StakingSession>>, ticker: &Rc<RefCell<Option<Interval>>>, interval_ms: u32) {
    if ticker.borrow().is_some() || !session.borrow().has_pending_work() {
        return;
    }
    let (ticking, slot) = (session.clone(), ticker.clone());
    let interval = Interval::new(interval_ms, move || {
        let idle = match ticking.try_borrow_mut() {
            Ok(mut s) => {
                s.tick(Instant::now());
                !s.has_pending_work()
            }
            Err(_) => false,
        };
        if idle {
            // Cancelled from a microtask: the interval's closure is still running here.
            if let Some(t) = slot.borrow_mut().take() {
                spawn_local(async move {
                    t.cancel();
                });
            }
        }
    });
    *ticker.borrow_mut() = Some(interval);
}

#[wasm_bindgen]
impl WasmStaking {
    #[wasm_bindgen(constructor)]
    pub fn new(graphql_url: Option<String>) -> Result<WasmStaking, JsValue> {
        let mut config = Config::default();
        if let Some(url) = graphql_url {
            config.graphql_url = url;
        }
        let client = GraphqlClient::new(&config.graphql_url, config.request_timeout_ms)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let location = Arc::new(BrowserLocation);
        let ctx = SyncContext::new(Arc::new(LocalStorageStore), location.clone());
        let interval_ms = u32::try_from(config.scroll_interval_ms).unwrap_or(u32::MAX);
        let session = Rc::new(RefCell::new(StakingSession::new(ctx, config)));

        Ok(WasmStaking {
            session,
            client: Rc::new(client),
            location,
            ticker: Rc::new(RefCell::new(None)),
            interval_ms,
        })
    }

    /// Reconcile the current address bar with stored state. Returns `true`
    /// when either side was rewritten and the page should re-render.
    pub fn mount(&self) -> bool {
        let search = self.location.search();
        self.session.borrow().mount(&search) != Reconcile::RenderDirect
    }

    /// Fetch the pool list in the background. The page re-reads snapshots
    /// when `on_done` is called.
    pub fn refresh(&self, on_done: js_sys::Function) {
        let Some((id, options)) = self.session.borrow_mut().begin_refresh(Instant::now()) else {
            return;
        };
        let session = self.session.clone();
        let client = self.client.clone();
        spawn_local(async move {
            let result = client.query(POOL_LIST_QUERY, options.variables).await;
            session.borrow_mut().complete_refresh(id, result);
            let _ = on_done.call0(&JsValue::NULL);
        });
    }

    pub fn list_json(&self, page: usize) -> String {
        to_json(&self.session.borrow().list_snapshot(page))
    }

    pub fn compare_json(&self, viewport_width: u32) -> String {
        to_json(&self.session.borrow().compare_snapshot(viewport_width))
    }

    pub fn share_query(&self) -> String {
        self.session.borrow().list.get_screen_url_query()
    }

    /// Apply a JSON-encoded action. Returns whether it was handled.
    pub fn handle_action_json(&self, action_json: String) -> bool {
        let handled = match serde_json::from_str::<UiAction>(&action_json) {
            Ok(action) => ui_action::apply(&mut self.session.borrow_mut(), action, Instant::now()),
            Err(e) => {
                log::warn!("Failed to deserialize UiAction ({e}): {action_json:?}");
                false
            }
        };
        wake(&self.session, &self.ticker, self.interval_ms);
        handled
    }

    pub fn export_json(&self) -> Result<String, JsValue> {
        let (file_name, contents) = self
            .session
            .borrow()
            .export(Utc::now())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(to_json(&ExportFile { file_name, contents }))
    }

    /// Screen teardown. Safe to call twice.
    pub fn dispose(&mut self) {
        if let Some(t) = self.ticker.borrow_mut().take() {
            t.cancel();
        }
        self.session.borrow_mut().dispose();
    }
}
