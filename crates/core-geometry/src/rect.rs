//! Axis-aligned rectangles.
//!
//! A `Rect` covers `[x1, x2) x [y1, y2)`. Rectangles with `x1 >= x2` or
//! `y1 >= y2` are empty; they are legal values (thickening by a negative
//! amount or subtracting can produce them) and are dropped by
//! `Rects::simplify`.

/// Scalar used for both document and device coordinates.
pub type Coord = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rect {
    pub x1: Coord,
    pub y1: Coord,
    pub x2: Coord,
    pub y2: Coord,
}

impl Rect {
    pub const fn new(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 || self.y1 >= self.y2
    }

    #[inline]
    pub fn width(&self) -> Coord {
        (self.x2 - self.x1).max(0)
    }

    #[inline]
    pub fn height(&self) -> Coord {
        (self.y2 - self.y1).max(0)
    }

    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    #[inline]
    pub fn contains_point(&self, x: Coord, y: Coord) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// True when every point of `other` lies inside `self`. Empty rectangles
    /// are contained in anything.
    pub fn contains(&self, other: &Rect) -> bool {
        other.is_empty()
            || (self.x1 <= other.x1
                && self.y1 <= other.y1
                && other.x2 <= self.x2
                && other.y2 <= self.y2)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        (!r.is_empty()).then_some(r)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Smallest rectangle covering both operands (empty operands ignored).
    pub fn bounding_union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::new(
            self.x1.min(other.x1),
            self.y1.min(other.y1),
            self.x2.max(other.x2),
            self.y2.max(other.y2),
        )
    }

    /// Expand symmetrically by `dx` horizontally and `dy` vertically.
    pub fn thicken(&self, dx: Coord, dy: Coord) -> Rect {
        Rect::new(self.x1 - dx, self.y1 - dy, self.x2 + dx, self.y2 + dy)
    }

    pub fn translate(&self, dx: Coord, dy: Coord) -> Rect {
        Rect::new(self.x1 + dx, self.y1 + dy, self.x2 + dx, self.y2 + dy)
    }

    /// Region of `self` not covered by `cut`, as at most four disjoint pieces
    /// (top band, bottom band, then left/right slices of the overlap rows).
    pub fn subtract(&self, cut: &Rect) -> Vec<Rect> {
        if self.is_empty() {
            return Vec::new();
        }
        let Some(o) = self.intersection(cut) else {
            return vec![*self];
        };
        let mut out = Vec::with_capacity(4);
        if self.y1 < o.y1 {
            out.push(Rect::new(self.x1, self.y1, self.x2, o.y1));
        }
        if o.y2 < self.y2 {
            out.push(Rect::new(self.x1, o.y2, self.x2, self.y2));
        }
        if self.x1 < o.x1 {
            out.push(Rect::new(self.x1, o.y1, o.x1, o.y2));
        }
        if o.x2 < self.x2 {
            out.push(Rect::new(o.x2, o.y1, self.x2, o.y2));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 4, 10).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn subtract_disjoint_keeps_original() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 30, 30);
        assert_eq!(a.subtract(&b), vec![a]);
    }

    #[test]
    fn subtract_center_hole_yields_four_pieces() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(3, 3, 7, 7);
        let pieces = a.subtract(&b);
        assert_eq!(pieces.len(), 4);
        let area: i128 = pieces.iter().map(Rect::area).sum();
        assert_eq!(area, 100 - 16);
        for p in &pieces {
            assert!(p.intersection(&b).is_none());
        }
    }

    #[test]
    fn subtract_full_cover_is_empty() {
        let a = Rect::new(2, 2, 4, 4);
        assert!(a.subtract(&Rect::new(0, 0, 10, 10)).is_empty());
    }

    #[test]
    fn thicken_and_translate() {
        let r = Rect::new(10, 10, 20, 30).thicken(2, 3);
        assert_eq!(r, Rect::new(8, 7, 22, 33));
        assert_eq!(r.translate(-8, 1), Rect::new(0, 8, 14, 34));
    }

    #[test]
    fn bounding_union_ignores_empty() {
        let a = Rect::new(0, 0, 5, 5);
        assert_eq!(a.bounding_union(&Rect::default()), a);
        assert_eq!(
            a.bounding_union(&Rect::new(10, -2, 12, 3)),
            Rect::new(0, -2, 12, 5)
        );
    }
}
