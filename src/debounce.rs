//! Timer-based coalescing for bursty UI events.
//!
//! Callers pass the current time explicitly, so the owner decides where time
//! comes from (an event loop tick, a browser timer, or a test clock).
//!
//! # Example
//! ```
//! use seiza::debounce::Debouncer;
//! use std::time::{Duration, Instant};
//!
//! let mut d = Debouncer::new(Duration::from_millis(100));
//! let t0 = Instant::now();
//! d.schedule(t0, || println!("search"));
//! assert!(!d.fire_due(t0 + Duration::from_millis(50)));
//! assert!(d.fire_due(t0 + Duration::from_millis(100)));
//! ```

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

type Pending = Box<dyn FnOnce()>;

/// Runs only the most recently scheduled action, once `delay` has passed
/// without another `schedule`.
pub struct Debouncer {
    delay: Duration,
    pending: Option<(Instant, Pending)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace any pending action and restart the window.
    pub fn schedule(&mut self, now: Instant, action: impl FnOnce() + 'static) {
        self.pending = Some((now + self.delay, Box::new(action)));
    }

    /// Run the pending action if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => {}
            _ => return false,
        }
        if let Some((_, action)) = self.pending.take() {
            action();
        }
        true
    }

    /// Run the pending action immediately (e.g. on blur or submit).
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some((_, action)) => {
                action();
                true
            }
            None => false,
        }
    }

    /// Drop the pending action without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(d, _)| *d)
    }
}

/// Leading-edge rate limiter: at most one pass per `interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn allow(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn only_last_action_runs() {
        let hits = Rc::new(RefCell::new(Vec::new()));
        let mut d = Debouncer::new(ms(100));
        let t0 = Instant::now();

        for (i, at) in [0u64, 30, 60].into_iter().enumerate() {
            let h = hits.clone();
            d.schedule(t0 + ms(at), move || h.borrow_mut().push(i));
        }
        assert!(!d.fire_due(t0 + ms(150)));
        assert!(d.fire_due(t0 + ms(160)));
        assert!(!d.fire_due(t0 + ms(500)));
        assert_eq!(*hits.borrow(), vec![2]);
    }

    #[test]
    fn cancel_drops_pending() {
        let hit = Rc::new(RefCell::new(false));
        let mut d = Debouncer::new(ms(10));
        let t0 = Instant::now();
        let h = hit.clone();
        d.schedule(t0, move || *h.borrow_mut() = true);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.fire_due(t0 + ms(100)));
        assert!(!*hit.borrow());
    }

    #[test]
    fn flush_runs_early() {
        let hit = Rc::new(RefCell::new(0));
        let mut d = Debouncer::new(ms(1000));
        let h = hit.clone();
        d.schedule(Instant::now(), move || *h.borrow_mut() += 1);
        assert!(d.flush());
        assert!(!d.flush());
        assert_eq!(*hit.borrow(), 1);
    }

    #[test]
    fn throttle_passes_once_per_interval() {
        let mut t = Throttle::new(ms(100));
        let t0 = Instant::now();
        assert!(t.allow(t0));
        assert!(!t.allow(t0 + ms(99)));
        assert!(t.allow(t0 + ms(100)));
        t.reset();
        assert!(t.allow(t0 + ms(101)));
    }
}
