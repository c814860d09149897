//! Damage, painting and visibility for the editing surface.
//!
//! This crate knows nothing about the document; it works on rectangles,
//! caret snapshots and selection state handed to it by the surface.
//!
//! Exposed Components:
//! - `damage`: `DamageTracker` collecting device-space rectangles during one
//!   apply pass and `Damage`, the simplified one-shot result (`None`,
//!   `Region`, `All`).
//! - `paint`: the `Device` drawing seam, `Color`, and the painters for the
//!   caret, environment highlights, selections and the page surround.
//! - `viewport`: pure caret / selection-endpoint scroll decisions.
//! - `metrics`: atomic execution counters with a copyable snapshot.
//!
//! Coordinate spaces:
//! - Painters draw in document coordinates; the device applies the shrink
//!   factor itself.
//! - Damage handed to the window is in device coordinates, rounded outward
//!   from document space so it always covers what changed.
//!
//! Invariants:
//! - A `DamageTracker` is drained exactly once per pass (`take`).
//! - `Damage::All` absorbs any region damage recorded in the same pass.

pub mod damage;
pub mod metrics;
pub mod paint;
pub mod viewport;

pub use damage::{Damage, DamageTracker};
pub use metrics::{SurfaceMetrics, SurfaceMetricsSnapshot};
pub use paint::{CaretStyle, Color, Device, PageMedium};
pub use viewport::{Viewport, VisibilityPolicy};
