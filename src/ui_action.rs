//! User actions from the DOM (data flow: JS -> Rust).

use crate::scroll::{Arrow, ObservedContainer, ScrollKey, TableRect};
use crate::staking::{Performance, StakingSession};
use serde::Deserialize;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum UiAction {
    // ----- List screen -----
    SetSearch { text: String },
    /// Search box lost focus: commit without waiting.
    CommitSearch,
    SetUserAda { amount: u64 },
    ToggleSort { field: String },
    SetPerformance { performance: Performance },
    ToggleFilters,
    SetRange { field: String, min: f64, max: f64 },
    ClearRange { field: String },
    ResetRanges,

    // ----- Selection -----
    TogglePool { hash: String },
    ClearPools,
    ImportPools { text: String },
    DismissImportError,

    // ----- Comparison -----
    ArrowDown { arrow: Arrow },
    ArrowUp,
    ArrowLeave,
    Key { key: String },
    FocusMatrix { focused: bool },
    SetFullscreen { on: bool },
    Measure { scroll_width: f64, client_width: f64 },
    Viewport { source: ObservedContainer, rect: TableRect, viewport_height: f64 },
    ToggleCard { id: String },
    ExpandAll,
    CollapseAll,
}

/// Apply one action. Returns `false` when the action was ignored.
pub fn apply(session: &mut StakingSession, action: UiAction, now: Instant) -> bool {
    match action {
        UiAction::SetSearch { text } => session.search.input(now, text),
        UiAction::CommitSearch => {
            session.search.flush();
        }
        UiAction::SetUserAda { amount } => session.user_ada.input(now, amount),
        UiAction::ToggleSort { field } => session.toggle_sort(&field),
        UiAction::SetPerformance { performance } => session.set_performance(performance),
        UiAction::ToggleFilters => session.toggle_filters(),
        UiAction::SetRange { field, min, max } => return session.ranges.set_value(&field, Some((min, max))),
        UiAction::ClearRange { field } => return session.ranges.set_value(&field, None),
        UiAction::ResetRanges => session.ranges.reset_all(),

        UiAction::TogglePool { hash } => {
            if let Err(e) = session.list.selected_pools.toggle_pool(&hash) {
                log::warn!("[action] toggle pool: {e:#}");
                return false;
            }
        }
        UiAction::ClearPools => session.list.selected_pools.clear(),
        UiAction::ImportPools { text } => return session.import(&text),
        UiAction::DismissImportError => session.dismiss_import_error(),

        UiAction::ArrowDown { arrow } => session.matrix.scroll.pointer_down(arrow, now),
        UiAction::ArrowUp => session.matrix.scroll.pointer_up(),
        UiAction::ArrowLeave => session.matrix.scroll.pointer_leave(),
        UiAction::Key { key } => {
            let m = &mut session.matrix;
            return m.scroll.key_down(ScrollKey::from_key_name(&key), &mut m.container);
        }
        UiAction::FocusMatrix { focused } => session.matrix.scroll.set_keyboard_target(focused),
        UiAction::SetFullscreen { on } => session.matrix.set_fullscreen(on),
        UiAction::Measure { scroll_width, client_width } => {
            session.matrix.measure(scroll_width, client_width)
        }
        UiAction::Viewport { source, rect, viewport_height } => {
            session
                .matrix
                .scroll
                .on_scroll_or_resize(source, now, rect, viewport_height)
        }
        UiAction::ToggleCard { id } => session.cards.toggle(&id),
        UiAction::ExpandAll => session.cards.expand_all(),
        UiAction::CollapseAll => session.cards.collapse_all(),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::kv::MemoryStore;
    use crate::location::MemoryLocation;
    use crate::scroll::HoldState;
    use crate::sync::SyncContext;
    use std::sync::Arc;
    use std::time::Duration;

    fn session() -> StakingSession {
        let ctx = SyncContext::new(Arc::new(MemoryStore::new()), Arc::new(MemoryLocation::default()));
        StakingSession::new(ctx, Config::default())
    }

    fn parse(json: &str) -> UiAction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn actions_deserialize_from_dom_json() {
        assert_eq!(parse(r#"{"type":"ToggleFilters"}"#), UiAction::ToggleFilters);
        assert_eq!(
            parse(r#"{"type":"SetPerformance","performance":"year"}"#),
            UiAction::SetPerformance { performance: Performance::Year }
        );
        assert_eq!(
            parse(r#"{"type":"ArrowDown","arrow":"right"}"#),
            UiAction::ArrowDown { arrow: Arrow::Right }
        );
        assert!(serde_json::from_str::<UiAction>(r#"{"type":"Nope"}"#).is_err());
    }

    #[test]
    fn pool_toggle_and_sort() {
        let mut s = session();
        let now = Instant::now();
        assert!(apply(&mut s, UiAction::TogglePool { hash: "p1".into() }, now));
        assert_eq!(s.list.selected_pools.selected(), vec!["p1".to_string()]);
        apply(&mut s, UiAction::TogglePool { hash: "p1".into() }, now);
        assert!(s.list.selected_pools.selected().is_empty());

        apply(&mut s, UiAction::ToggleSort { field: "revenue".into() }, now);
        assert_eq!(s.list.sort_by.read().order, crate::filters::SortOrder::Asc);
    }

    #[test]
    fn hold_then_key_without_focus() {
        let mut s = session();
        let now = Instant::now();
        apply(&mut s, UiAction::Measure { scroll_width: 1000.0, client_width: 400.0 }, now);
        apply(&mut s, UiAction::ArrowDown { arrow: Arrow::Right }, now);
        assert_eq!(s.matrix.scroll.hold_state(), HoldState::HoldingRight);
        s.tick(now + Duration::from_millis(32));
        assert_eq!(s.matrix.container.scroll_left, 28.0);
        apply(&mut s, UiAction::ArrowUp, now);
        assert!(!apply(&mut s, UiAction::Key { key: "ArrowRight".into() }, now));
        apply(&mut s, UiAction::FocusMatrix { focused: true }, now);
        assert!(apply(&mut s, UiAction::Key { key: "ArrowLeft".into() }, now));
        assert_eq!(s.matrix.container.scroll_left, 14.0);
    }

    #[test]
    fn unknown_range_field_is_ignored() {
        let mut s = session();
        assert!(!apply(&mut s, UiAction::ClearRange { field: "stake".into() }, Instant::now()));
    }
}
