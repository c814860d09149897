//! Damage tracking for one apply pass.
//!
//! Collects device-space rectangles marked stale while the pipeline runs and
//! hands them to the window once, at the end of the pass. Document-space
//! marks are converted with outward rounding so the device region always
//! covers the document region.
//!
//! Merge semantics:
//! * `All` absorbs everything: once a full invalidation is requested, region
//!   marks are dropped.
//! * Region marks accumulate unsimplified; `take` simplifies once.
//!
//! Invariants:
//! * After `take`, the tracker is empty (one-shot consumption).
//! * `take` never returns an empty `Region`; no marks yields `Damage::None`.

use core_geometry::{Rect, Rects, Scaler};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Damage {
    #[default]
    None,
    /// Device-space rectangles, simplified.
    Region(Rects),
    /// The whole surface must be redrawn.
    All,
}

impl Damage {
    pub fn is_none(&self) -> bool {
        matches!(self, Damage::None)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Damage::All)
    }

    /// Rectangles of a region damage (empty for `None` and `All`).
    pub fn rects(&self) -> &[Rect] {
        match self {
            Damage::Region(rs) => rs.as_slice(),
            _ => &[],
        }
    }
}

#[derive(Debug, Default)]
pub struct DamageTracker {
    rects: Rects,
    all: bool,
    marks: u64,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a device-space rectangle.
    pub fn mark(&mut self, r: Rect) {
        self.marks += 1;
        if self.all || r.is_empty() {
            return;
        }
        self.rects.push(r);
    }

    /// Mark a document-space rectangle, rounding outward to device pixels.
    pub fn mark_doc(&mut self, r: &Rect, scaler: &Scaler) {
        self.mark(scaler.to_device_outer(r));
    }

    /// Mark every member of a document-space set, each padded by one pixel.
    pub fn mark_doc_set(&mut self, rs: &Rects, scaler: &Scaler) {
        let p = scaler.pixel();
        for r in rs {
            self.mark_doc(&r.thicken(p, p), scaler);
        }
    }

    pub fn mark_all(&mut self) {
        self.marks += 1;
        if !self.all {
            trace!(target: "render.damage", dropped = self.rects.len(), "damage_escalate_all");
        }
        self.all = true;
        self.rects = Rects::new();
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.rects.is_empty()
    }

    /// Number of mark calls since the last `take` (including absorbed ones).
    pub fn marks(&self) -> u64 {
        self.marks
    }

    /// Consume the accumulated damage.
    pub fn take(&mut self) -> Damage {
        let all = std::mem::take(&mut self.all);
        let rects = std::mem::take(&mut self.rects);
        self.marks = 0;
        if all {
            return Damage::All;
        }
        if rects.is_empty() {
            return Damage::None;
        }
        Damage::Region(rects.simplify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn take_is_one_shot() {
        let mut t = DamageTracker::new();
        t.mark(Rect::new(0, 0, 4, 4));
        t.mark(Rect::new(0, 0, 4, 4));
        assert_eq!(t.take(), Damage::Region(Rects::single(Rect::new(0, 0, 4, 4))));
        assert!(t.is_empty());
        assert_eq!(t.take(), Damage::None);
    }

    #[test]
    fn all_absorbs_regions() {
        let mut t = DamageTracker::new();
        t.mark(Rect::new(0, 0, 4, 4));
        t.mark_all();
        t.mark(Rect::new(10, 10, 20, 20));
        assert_eq!(t.marks(), 3);
        assert_eq!(t.take(), Damage::All);
    }

    #[test]
    fn empty_marks_are_ignored() {
        let mut t = DamageTracker::new();
        t.mark(Rect::new(5, 5, 5, 9));
        assert_eq!(t.take(), Damage::None);
    }

    #[test]
    fn doc_marks_round_outward() {
        let s = Scaler::new(2, 1);
        let mut t = DamageTracker::new();
        t.mark_doc(&Rect::new(-3, 1, 5, 7), &s);
        // lower(-3) = (-3-1)/2 = -2, lower(1) = 0, upper(5) = 3, upper(7) = 4
        assert_eq!(t.take().rects(), &[Rect::new(-2, 0, 3, 4)]);
    }

    #[test]
    fn doc_set_marks_are_padded_by_a_pixel() {
        let s = Scaler::new(1, 2);
        let mut t = DamageTracker::new();
        t.mark_doc_set(&Rects::single(Rect::new(10, 10, 20, 20)), &s);
        assert_eq!(t.take().rects(), &[Rect::new(8, 8, 22, 22)]);
    }
}
