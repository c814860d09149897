//! Rectangle sets.
//!
//! A `Rects` is an ordered list of rectangles that may overlap. All
//! operations are pure and return new sets; the *covered area* never depends
//! on the input order, only the concrete members do. `simplify` produces the
//! canonical form: no empty members, no duplicates, no member contained in
//! another, and members sharing a full edge (or overlapping with the same
//! span) merged.
//!
//! Damage for moving decorations (caret, selection) is always computed as
//! the union of old and new outlines rather than their difference: the
//! redraw of the old area is what erases the previous decoration.
//!
//! Invariants:
//! * `subtract(a, b)` never covers a point covered by `b`.
//! * `simplify` preserves coverage exactly.
//! * `simplify` is idempotent.

use crate::rect::{Coord, Rect};

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Rects {
    items: Vec<Rect>,
}

impl Rects {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn single(r: Rect) -> Self {
        Self { items: vec![r] }
    }

    pub fn push(&mut self, r: Rect) {
        self.items.push(r);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rect> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Rect] {
        &self.items
    }

    /// Members of both sets, `self` first. Not simplified.
    pub fn union(&self, other: &Rects) -> Rects {
        let mut items = Vec::with_capacity(self.items.len() + other.items.len());
        items.extend_from_slice(&self.items);
        items.extend_from_slice(&other.items);
        Rects { items }
    }

    /// Area covered by `self` but not by `other`.
    pub fn subtract(&self, other: &Rects) -> Rects {
        let mut current: Vec<Rect> = self.items.iter().filter(|r| !r.is_empty()).copied().collect();
        for cut in other.items.iter().filter(|r| !r.is_empty()) {
            current = current.iter().flat_map(|r| r.subtract(cut)).collect();
            if current.is_empty() {
                break;
            }
        }
        Rects { items: current }
    }

    pub fn thicken(&self, dx: Coord, dy: Coord) -> Rects {
        self.items.iter().map(|r| r.thicken(dx, dy)).collect()
    }

    pub fn translate(&self, dx: Coord, dy: Coord) -> Rects {
        self.items.iter().map(|r| r.translate(dx, dy)).collect()
    }

    /// Border shape around `self`: the band between the shape thickened by
    /// `outer` and the shape thickened by `inner`, simplified. Used for
    /// selection and environment highlights so their painted borders are
    /// fully covered by damage.
    pub fn outline(&self, inner: (Coord, Coord), outer: (Coord, Coord)) -> Rects {
        self.thicken(outer.0, outer.1)
            .subtract(&self.thicken(inner.0, inner.1))
            .simplify()
    }

    pub fn covers(&self, x: Coord, y: Coord) -> bool {
        self.items.iter().any(|r| r.contains_point(x, y))
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        self.items
            .iter()
            .filter(|r| !r.is_empty())
            .copied()
            .reduce(|a, b| a.bounding_union(&b))
    }

    /// Pairwise disjoint rectangles covering the same area.
    pub fn disjoint(&self) -> Rects {
        let mut acc = Rects::new();
        for r in self.items.iter().filter(|r| !r.is_empty()) {
            let pieces = Rects::single(*r).subtract(&acc);
            acc.items.extend(pieces.items);
        }
        acc
    }

    /// Exact covered area (overlaps counted once).
    pub fn area(&self) -> i128 {
        self.disjoint().items.iter().map(Rect::area).sum()
    }

    /// Canonical minimal cover; see module docs.
    pub fn simplify(&self) -> Rects {
        let mut v: Vec<Rect> = self.items.iter().filter(|r| !r.is_empty()).copied().collect();
        let before = v.len();
        loop {
            v.sort_unstable_by_key(|r| (r.y1, r.x1, r.y2, r.x2));
            v.dedup();
            remove_contained(&mut v);
            if !merge_one(&mut v) {
                break;
            }
        }
        v.sort_unstable_by_key(|r| (r.y1, r.x1, r.y2, r.x2));
        tracing::trace!(target: "geometry.rects", before, after = v.len(), "simplify");
        Rects { items: v }
    }
}

fn remove_contained(v: &mut Vec<Rect>) {
    let mut i = 0;
    while i < v.len() {
        let contained = v
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && other.contains(&v[i]));
        if contained {
            v.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Merge the first pair with identical span on one axis whose intervals on
/// the other axis touch or overlap. Returns false when nothing merged.
fn merge_one(v: &mut Vec<Rect>) -> bool {
    for i in 0..v.len() {
        for j in (i + 1)..v.len() {
            if let Some(m) = merge_pair(&v[i], &v[j]) {
                v[i] = m;
                v.swap_remove(j);
                return true;
            }
        }
    }
    false
}

fn merge_pair(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.y1 == b.y1 && a.y2 == b.y2 && a.x1 <= b.x2 && b.x1 <= a.x2 {
        return Some(Rect::new(a.x1.min(b.x1), a.y1, a.x2.max(b.x2), a.y2));
    }
    if a.x1 == b.x1 && a.x2 == b.x2 && a.y1 <= b.y2 && b.y1 <= a.y2 {
        return Some(Rect::new(a.x1, a.y1.min(b.y1), a.x2, a.y2.max(b.y2)));
    }
    None
}

impl FromIterator<Rect> for Rects {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        Rects {
            items: iter.into_iter().collect(),
        }
    }
}

impl Extend<Rect> for Rects {
    fn extend<I: IntoIterator<Item = Rect>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl IntoIterator for Rects {
    type Item = Rect;
    type IntoIter = std::vec::IntoIter<Rect>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rects {
    type Item = &'a Rect;
    type IntoIter = std::slice::Iter<'a, Rect>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl From<Vec<Rect>> for Rects {
    fn from(items: Vec<Rect>) -> Self {
        Rects { items }
    }
}
