//! Caret geometry snapshots.
//!
//! The caret is a (possibly slanted) stem anchored at `(ox, oy)` spanning
//! `y1..y2` relative to the anchor, with horizontal offset `y * slope` for
//! italic text. The surface keeps two snapshots: the current one and the
//! previous ("shadow") one, whose outlines together form the damage of a
//! caret move.

use core_geometry::{Coord, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCursor {
    pub ox: Coord,
    pub oy: Coord,
    pub y1: Coord,
    pub y2: Coord,
    pub slope: f64,
    /// False when the caret position could not be verified against layout.
    pub valid: bool,
}

impl Default for ShadowCursor {
    fn default() -> Self {
        Self::at(0, 0)
    }
}

impl ShadowCursor {
    /// Zero-height caret at an anchor.
    pub fn at(ox: Coord, oy: Coord) -> Self {
        Self {
            ox,
            oy,
            y1: 0,
            y2: 0,
            slope: 0.0,
            valid: true,
        }
    }

    pub fn new(ox: Coord, oy: Coord, y1: Coord, y2: Coord, slope: f64, valid: bool) -> Self {
        Self {
            ox,
            oy,
            y1,
            y2,
            slope,
            valid,
        }
    }

    /// Horizontal position of the stem at relative height `y`.
    #[inline]
    pub fn x_at(&self, y: Coord) -> Coord {
        self.ox + (y as f64 * self.slope) as Coord
    }

    /// Copy with the vertical extent grown by `dy` at both ends.
    pub fn stretched(&self, dy: Coord) -> Self {
        Self {
            y1: self.y1 - dy,
            y2: self.y2 + dy,
            ..*self
        }
    }

    /// Absolute stem endpoints `(x1, y1, x2, y2)`.
    pub fn stem(&self) -> (Coord, Coord, Coord, Coord) {
        (
            self.x_at(self.y1),
            self.oy + self.y1,
            self.x_at(self.y2),
            self.oy + self.y2,
        )
    }

    /// Region to damage for this caret, covering serifs and antialiasing:
    /// `3px` on the leading/vertical sides, `2px` on the trailing side.
    pub fn damage_outline(&self, pixel: Coord) -> Rect {
        let p2 = 2 * pixel;
        let p3 = 3 * pixel;
        Rect::new(
            self.x_at(self.y1) - p3,
            self.oy + self.y1 - p3,
            self.x_at(self.y2) + p2,
            self.oy + self.y2 + p3,
        )
    }
}
