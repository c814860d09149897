//! Screen geometry shared by the damage pipeline.
//!
//! Two coordinate spaces exist in the surface:
//! * Document space: layout units (`Coord`), where one device pixel spans
//!   `shrink_factor * base_pixel` units.
//! * Device space: window pixels scaled by the base pixel only.
//!
//! `Rect` / `Rects` carry no space tag; callers keep track of which space a
//! value lives in. `Scaler` is the only place that crosses between them and
//! owns the outward rounding rules that guarantee damage never under-covers.
//!
//! Components:
//! - `rect`: single axis-aligned rectangle (half-open on both axes).
//! - `rects`: rectangle sets with union / subtract / thicken / translate /
//!   simplify and the `outline` helper used for selection and environment
//!   highlighting.
//! - `scale`: bidirectional document <-> device mapping.

pub mod rect;
pub mod rects;
pub mod scale;

pub use rect::{Coord, Rect};
pub use rects::Rects;
pub use scale::Scaler;
