//! Viewport visibility decisions.
//!
//! A `Viewport` is the visible part of the document in document coordinates
//! (y grows upward, so `visible.y2` is the top edge). Scroll targets are the
//! new `(left, top)` corner to pass to the window's `scroll_to`.
//!
//! Two policies:
//! * Caret: if the caret stem, stretched by `2px` at both ends, leaves the
//!   visible rectangle on any side, recenter on the caret anchor.
//! * Selection endpoint: only for viewports larger than `min_extent` pixels
//!   in both directions. Each axis independently scrolls when the endpoint
//!   lies within `margin` pixels of an edge; the other axis keeps its
//!   current position.
//!
//! Both are pure; the surface performs the scroll and requests a full
//! redraw. After scrolling, cached endpoint coordinates are shifted by
//! `origin_shift` instead of being re-queried.

use core_geometry::{Coord, Rect};
use core_state::ShadowCursor;

/// Margins in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub margin: Coord,
    pub min_extent: Coord,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            margin: 20,
            min_extent: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub visible: Rect,
}

impl Viewport {
    pub fn new(visible: Rect) -> Self {
        Self { visible }
    }

    pub fn width(&self) -> Coord {
        self.visible.width()
    }

    pub fn height(&self) -> Coord {
        self.visible.height()
    }

    /// Scroll target keeping the caret visible, or `None` when it already is.
    pub fn cursor_target(&self, cu: &ShadowCursor, pixel: Coord) -> Option<(Coord, Coord)> {
        let (x1, y1, x2, y2) = cu.stretched(2 * pixel).stem();
        let v = &self.visible;
        let outside = x1 < v.x1 || x2 >= v.x2 || y1 < v.y1 || y2 >= v.y2;
        if !outside {
            return None;
        }
        Some((cu.ox - (self.width() >> 1), cu.oy + (self.height() >> 1)))
    }

    /// Scroll target keeping a selection endpoint clear of the edges.
    pub fn endpoint_target(
        &self,
        end: (Coord, Coord),
        pixel: Coord,
        policy: &VisibilityPolicy,
    ) -> Option<(Coord, Coord)> {
        let v = &self.visible;
        let (w, h) = (self.width(), self.height());
        let min = policy.min_extent * pixel;
        if w <= min || h <= min {
            return None;
        }
        let m = policy.margin * pixel;
        let (ex, ey) = end;
        let scroll_x = ex < v.x1 + m || ex >= v.x2 - m;
        let scroll_y = ey < v.y1 + m || ey >= v.y2 - m;
        if !scroll_x && !scroll_y {
            return None;
        }
        let new_x = if scroll_x { ex - (w >> 1) } else { v.x1 };
        let new_y = if scroll_y { ey + (h >> 1) } else { v.y2 };
        Some((new_x, new_y))
    }

    /// Displacement of the bottom-left corner between two viewports.
    pub fn origin_shift(&self, after: &Viewport) -> (Coord, Coord) {
        (
            after.visible.x1 - self.visible.x1,
            after.visible.y1 - self.visible.y1,
        )
    }
}
