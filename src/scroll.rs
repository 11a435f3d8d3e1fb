//! Horizontal scrolling of wide comparison tables.
//!
//! - press-and-hold on a side arrow scrolls continuously by `step_px` every `interval`
//! - ArrowLeft/ArrowRight scroll one step per key press while the table is the keyboard target
//! - the floating arrows are kept vertically centered in the visible part of the table,
//!   recomputed (debounced) on scroll/resize of the observed container
//!
//! The controller does not own a timer; the view calls [`ScrollController::tick`]
//! from its repeat timer and [`ScrollController::poll`] from its event loop.

use crate::debounce::Debouncer;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

pub const SCROLL_SPEED: f64 = 14.0;
pub const SCROLL_INTERVAL: Duration = Duration::from_millis(16);
pub const OVERLAY_DEBOUNCE: Duration = Duration::from_millis(100);

/// Horizontal extent of a scrollable element, in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollContainer {
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub client_width: f64,
}

impl ScrollContainer {
    pub fn new(scroll_width: f64, client_width: f64) -> Self {
        Self {
            scroll_left: 0.0,
            scroll_width,
            client_width,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    /// Scroll by `dx`, stopping at the natural bounds. Returns the distance moved.
    pub fn scroll_by(&mut self, dx: f64) -> f64 {
        let before = self.scroll_left;
        self.scroll_left = (self.scroll_left + dx).clamp(0.0, self.max_scroll());
        self.scroll_left - before
    }
}

/// Which sides have more content off-screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EdgeOverlays {
    pub left: bool,
    pub right: bool,
}

impl EdgeOverlays {
    pub fn of(c: &ScrollContainer) -> Self {
        Self {
            left: c.scroll_left > 0.0,
            right: c.scroll_left < c.max_scroll(),
        }
    }
}

/// Vertical geometry of the table relative to the viewport, in px.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TableRect {
    pub top: f64,
    pub height: f64,
}

/// Offset from the table top that centers an arrow of `arrow_height` in the
/// visible part of the table. Falls back to 0 when the table is off-screen.
pub fn arrow_top_offset(rect: TableRect, viewport_height: f64, arrow_height: f64) -> f64 {
    let visible_top = rect.top.max(0.0);
    let visible_bottom = (rect.top + rect.height).min(viewport_height);
    if visible_bottom <= visible_top {
        return 0.0;
    }
    let center = (visible_top + visible_bottom) / 2.0 - rect.top;
    let max = (rect.height - arrow_height).max(0.0);
    (center - arrow_height / 2.0).clamp(0.0, max)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arrow {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldState {
    Idle,
    HoldingLeft,
    HoldingRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollKey {
    ArrowLeft,
    ArrowRight,
    Other,
}

impl ScrollKey {
    /// From a DOM `KeyboardEvent.key` value.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => ScrollKey::ArrowLeft,
            "ArrowRight" | "Right" => ScrollKey::ArrowRight,
            _ => ScrollKey::Other,
        }
    }
}

/// Where scroll/resize events come from: the page, or the fullscreen modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservedContainer {
    Page,
    Fullscreen,
}

/// Transient per-table state handed to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScrollState {
    pub is_holding_left: bool,
    pub is_holding_right: bool,
    pub top_offset: f64,
}

pub struct ScrollController {
    hold: HoldState,
    step_px: f64,
    interval: Duration,
    last_step: Option<Instant>,
    keyboard_target: bool,
    fullscreen: bool,
    arrow_height: f64,
    top_offset: Rc<Cell<f64>>,
    overlay: Debouncer,
    attached: bool,
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(SCROLL_SPEED, SCROLL_INTERVAL, OVERLAY_DEBOUNCE)
    }
}

impl ScrollController {
    pub fn new(step_px: f64, interval: Duration, overlay_debounce: Duration) -> Self {
        Self {
            hold: HoldState::Idle,
            step_px,
            interval,
            last_step: None,
            keyboard_target: false,
            fullscreen: false,
            arrow_height: 40.0,
            top_offset: Rc::new(Cell::new(0.0)),
            overlay: Debouncer::new(overlay_debounce),
            attached: true,
        }
    }

    pub fn with_arrow_height(mut self, px: f64) -> Self {
        self.arrow_height = px;
        self
    }

    pub fn hold_state(&self) -> HoldState {
        self.hold
    }

    pub fn step_px(&self) -> f64 {
        self.step_px
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> ScrollState {
        ScrollState {
            is_holding_left: self.hold == HoldState::HoldingLeft,
            is_holding_right: self.hold == HoldState::HoldingRight,
            top_offset: self.top_offset.get(),
        }
    }

    pub fn pointer_down(&mut self, arrow: Arrow, now: Instant) {
        if !self.attached {
            return;
        }
        self.hold = match arrow {
            Arrow::Left => HoldState::HoldingLeft,
            Arrow::Right => HoldState::HoldingRight,
        };
        self.last_step = Some(now);
    }

    pub fn pointer_up(&mut self) {
        self.release();
    }

    pub fn pointer_leave(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.hold = HoldState::Idle;
        self.last_step = None;
    }

    /// Advance the hold-repeat by every whole interval elapsed since the last
    /// step. Returns the distance actually scrolled.
    pub fn tick(&mut self, now: Instant, container: &mut ScrollContainer) -> f64 {
        let direction = match self.hold {
            HoldState::Idle => return 0.0,
            HoldState::HoldingLeft => -1.0,
            HoldState::HoldingRight => 1.0,
        };
        let Some(last) = self.last_step else {
            return 0.0;
        };
        if self.interval.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_duration_since(last);
        let steps = (elapsed.as_nanos() / self.interval.as_nanos()) as u32;
        if steps == 0 {
            return 0.0;
        }
        self.last_step = Some(last + self.interval * steps);
        container.scroll_by(direction * self.step_px * f64::from(steps))
    }

    pub fn set_keyboard_target(&mut self, focused: bool) {
        self.keyboard_target = focused;
    }

    /// One discrete step for arrow keys. Returns `true` when the key was handled.
    pub fn key_down(&mut self, key: ScrollKey, container: &mut ScrollContainer) -> bool {
        if !self.attached || !self.keyboard_target {
            return false;
        }
        match key {
            ScrollKey::ArrowLeft => {
                container.scroll_by(-self.step_px);
                true
            }
            ScrollKey::ArrowRight => {
                container.scroll_by(self.step_px);
                true
            }
            ScrollKey::Other => false,
        }
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Switch the observed container; a pending recompute for the old one is dropped.
    pub fn set_fullscreen(&mut self, on: bool) {
        if self.fullscreen != on {
            self.fullscreen = on;
            self.overlay.cancel();
            self.release();
        }
    }

    fn observed(&self) -> ObservedContainer {
        if self.fullscreen {
            ObservedContainer::Fullscreen
        } else {
            ObservedContainer::Page
        }
    }

    /// Scroll or resize of `source`. Only the active container is observed.
    pub fn on_scroll_or_resize(
        &mut self,
        source: ObservedContainer,
        now: Instant,
        rect: TableRect,
        viewport_height: f64,
    ) {
        if !self.attached || source != self.observed() {
            return;
        }
        let slot = self.top_offset.clone();
        let arrow_height = self.arrow_height;
        self.overlay.schedule(now, move || {
            slot.set(arrow_top_offset(rect, viewport_height, arrow_height));
        });
    }

    /// Apply a due overlay recompute. Returns `true` when the offset was updated.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.overlay.fire_due(now)
    }

    /// Teardown: stop repeating, drop pending work, ignore further events.
    pub fn dispose(&mut self) {
        self.release();
        self.overlay.cancel();
        self.attached = false;
        log::debug!("[scroll] controller disposed");
    }

    pub fn has_pending_work(&self) -> bool {
        self.hold != HoldState::Idle || self.overlay.is_pending()
    }
}
