//! Surface execution metrics.
//!
//! Counts what the apply pipeline and repaint handlers actually did, as
//! opposed to what callers requested through `notify`. Relaxed atomics: the
//! counters are diagnostic only and read through `snapshot`.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SurfaceMetrics {
    /// Apply passes that processed a non-empty change set.
    pub apply_passes: AtomicU64,
    /// Idle debounce passes that ran housekeeping.
    pub idle_passes: AtomicU64,
    /// Passes whose damage escalated to a full-surface redraw.
    pub full_invalidations: AtomicU64,
    /// Device rectangles handed to the window after simplification.
    pub damaged_rects: AtomicU64,
    /// Raw damage marks before simplification.
    pub damage_marks: AtomicU64,
    /// Repaint requests serviced.
    pub repaints: AtomicU64,
    /// Repaints cut short by a pending event.
    pub interrupted_repaints: AtomicU64,
    /// Scrolls performed to keep the caret or a selection endpoint visible.
    pub scroll_into_view: AtomicU64,
    /// Duration (ns) of the most recent non-empty apply pass.
    pub last_apply_ns: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceMetricsSnapshot {
    pub apply_passes: u64,
    pub idle_passes: u64,
    pub full_invalidations: u64,
    pub damaged_rects: u64,
    pub damage_marks: u64,
    pub repaints: u64,
    pub interrupted_repaints: u64,
    pub scroll_into_view: u64,
    pub last_apply_ns: u64,
}

impl SurfaceMetrics {
    pub fn snapshot(&self) -> SurfaceMetricsSnapshot {
        SurfaceMetricsSnapshot {
            apply_passes: self.apply_passes.load(Ordering::Relaxed),
            idle_passes: self.idle_passes.load(Ordering::Relaxed),
            full_invalidations: self.full_invalidations.load(Ordering::Relaxed),
            damaged_rects: self.damaged_rects.load(Ordering::Relaxed),
            damage_marks: self.damage_marks.load(Ordering::Relaxed),
            repaints: self.repaints.load(Ordering::Relaxed),
            interrupted_repaints: self.interrupted_repaints.load(Ordering::Relaxed),
            scroll_into_view: self.scroll_into_view.load(Ordering::Relaxed),
            last_apply_ns: self.last_apply_ns.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn record_apply(&self, marks: u64, rects: u64, full: bool, ns: u64) {
        Self::bump(&self.apply_passes, 1);
        Self::bump(&self.damage_marks, marks);
        Self::bump(&self.damaged_rects, rects);
        if full {
            Self::bump(&self.full_invalidations, 1);
        }
        self.last_apply_ns.store(ns, Ordering::Relaxed);
    }

    pub fn record_idle(&self) {
        Self::bump(&self.idle_passes, 1);
    }

    pub fn record_repaint(&self, interrupted: bool) {
        Self::bump(&self.repaints, 1);
        if interrupted {
            Self::bump(&self.interrupted_repaints, 1);
        }
    }

    pub fn record_scroll(&self) {
        Self::bump(&self.scroll_into_view, 1);
    }
}
