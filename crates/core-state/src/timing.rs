//! Apply/update timestamps and clock sources.
//!
//! `last_change` is the time of the last applied (or repaint-confirmed)
//! change, `last_update` the time housekeeping last caught up with it.
//! After an apply pass `last_update == last_change - 1`, meaning "applied, but
//! the idle housekeeping pass has not run yet". The idle pass sets them equal.
//!
//! Invariant: `last_update <= last_change` at all times.
//!
//! Timestamps are milliseconds from a monotonic origin. The idle comparison is
//! advisory: missing the interval only delays housekeeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Millisecond timestamp.
pub type Millis = i64;

pub trait Clock: Send {
    fn now_ms(&self) -> Millis;
}

/// Clock backed by `Instant`, counting from construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Manually advanced clock. Clones share the same time source, so a test can
/// keep one handle while the surface owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start)),
        }
    }

    pub fn advance(&self, ms: Millis) {
        self.now.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn set(&self, ms: Millis) {
        self.now.store(ms, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateTimes {
    last_change: Millis,
    last_update: Millis,
}

impl UpdateTimes {
    pub fn new(now: Millis) -> Self {
        Self {
            last_change: now,
            last_update: now - 1,
        }
    }

    pub fn last_change(&self) -> Millis {
        self.last_change
    }

    pub fn last_update(&self) -> Millis {
        self.last_update
    }

    /// Housekeeping has caught up with every applied change.
    pub fn is_settled(&self) -> bool {
        self.last_update == self.last_change
    }

    /// Exit of a non-empty apply pass.
    pub fn mark_applied(&mut self, now: Millis) {
        self.last_change = now;
        self.last_update = now - 1;
    }

    /// A repaint happened while housekeeping was still owed: restart the
    /// quiescence window from `now`.
    pub fn note_repaint(&mut self, now: Millis) {
        if self.last_change > self.last_update {
            self.last_change = now.max(self.last_change);
        }
    }

    /// Housekeeping is owed and the quiescence interval has elapsed.
    pub fn idle_due(&self, now: Millis, interval: Millis) -> bool {
        self.last_update < self.last_change && now >= self.last_change + interval
    }

    pub fn mark_settled(&mut self) {
        self.last_update = self.last_change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_times_owe_housekeeping() {
        let t = UpdateTimes::new(1000);
        assert!(!t.is_settled());
        assert!(!t.idle_due(1100, 166));
        assert!(t.idle_due(1166, 166));
    }

    #[test]
    fn repaint_restarts_window_only_when_owed() {
        let mut t = UpdateTimes::new(0);
        t.note_repaint(50);
        assert_eq!(t.last_change(), 50);
        t.mark_settled();
        t.note_repaint(500);
        assert_eq!(t.last_change(), 50, "settled times are left alone");
        assert!(t.last_update() <= t.last_change());
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new(10);
        let b = a.clone();
        a.advance(5);
        assert_eq!(b.now_ms(), 15);
        b.set(100);
        assert_eq!(a.now_ms(), 100);
    }
}
