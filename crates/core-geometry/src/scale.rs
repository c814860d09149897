//! Document <-> device coordinate mapping.
//!
//! Device coordinates are document coordinates divided by the shrink factor.
//! Divisions that produce damage or extents round *outward* so that the
//! device region always covers the document region:
//! * lower bounds: `(x - f + 1) / f`
//! * upper bounds: `(x + f - 1) / f`
//!
//! Multiplication back into document space is exact. Both formulas use
//! truncating integer division; for a device point `p` the round trip
//! `lower(p * f)` / `upper(p * f)` stays within `f - 1` of `p`, and is exact
//! at `f == 1`.

use crate::rect::{Coord, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scaler {
    factor: Coord,
    base_pixel: Coord,
}

impl Scaler {
    /// Panics when `factor` or `base_pixel` is not positive.
    pub fn new(factor: Coord, base_pixel: Coord) -> Self {
        assert!(factor > 0, "shrink factor must be positive (got {factor})");
        assert!(base_pixel > 0, "base pixel must be positive (got {base_pixel})");
        Self { factor, base_pixel }
    }

    #[inline]
    pub fn factor(&self) -> Coord {
        self.factor
    }

    #[inline]
    pub fn base_pixel(&self) -> Coord {
        self.base_pixel
    }

    /// Size of one device pixel in document units.
    #[inline]
    pub fn pixel(&self) -> Coord {
        self.factor * self.base_pixel
    }

    /// Update the factor; returns true when it changed.
    pub fn set_factor(&mut self, factor: Coord) -> bool {
        assert!(factor > 0, "shrink factor must be positive (got {factor})");
        if self.factor == factor {
            return false;
        }
        self.factor = factor;
        true
    }

    #[inline]
    pub fn lower(&self, x: Coord) -> Coord {
        (x - self.factor + 1) / self.factor
    }

    #[inline]
    pub fn upper(&self, x: Coord) -> Coord {
        (x + self.factor - 1) / self.factor
    }

    /// Document rectangle -> device rectangle covering it.
    pub fn to_device_outer(&self, r: &Rect) -> Rect {
        Rect::new(
            self.lower(r.x1),
            self.lower(r.y1),
            self.upper(r.x2),
            self.upper(r.y2),
        )
    }

    /// Plain truncating division (scroll targets, repaint regions).
    #[inline]
    pub fn to_device(&self, x: Coord) -> Coord {
        x / self.factor
    }

    pub fn rect_to_device(&self, r: &Rect) -> Rect {
        Rect::new(
            self.to_device(r.x1),
            self.to_device(r.y1),
            self.to_device(r.x2),
            self.to_device(r.y2),
        )
    }

    #[inline]
    pub fn to_document(&self, x: Coord) -> Coord {
        x * self.factor
    }

    pub fn rect_to_document(&self, r: &Rect) -> Rect {
        Rect::new(
            self.to_document(r.x1),
            self.to_document(r.y1),
            self.to_document(r.x2),
            self.to_document(r.y2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outward_rounding_covers_region() {
        let s = Scaler::new(3, 256);
        let doc = Rect::new(10, 10, 20, 20);
        let dev = s.to_device_outer(&doc);
        assert!(s.rect_to_document(&dev).contains(&doc));
    }

    #[test]
    fn factor_one_is_identity() {
        let s = Scaler::new(1, 256);
        let r = Rect::new(-7, 3, 11, 42);
        assert_eq!(s.to_device_outer(&r), r);
        assert_eq!(s.rect_to_document(&r), r);
    }

    #[test]
    fn pixel_tracks_factor() {
        let mut s = Scaler::new(2, 256);
        assert_eq!(s.pixel(), 512);
        assert!(s.set_factor(4));
        assert!(!s.set_factor(4));
        assert_eq!(s.pixel(), 1024);
    }

    #[test]
    #[should_panic(expected = "shrink factor must be positive")]
    fn zero_factor_is_rejected() {
        let _ = Scaler::new(0, 256);
    }
}
