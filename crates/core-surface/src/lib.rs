//! The editing surface: incremental state sync between a document and the
//! window that shows it.
//!
//! Mutators record *what kind* of change happened (`EditSurface::notify`);
//! once per tick `apply_changes` folds all pending changes into one pass of
//! ordered phases and hands the window a single batch of damage. Repaint
//! requests are serviced from already-applied state.
//!
//! Modules:
//! - `collab`: `Document` and `Window` collaborator traits, `TreePath`, `NodeKind`.
//! - `surface`: `EditSurface`, window handlers and session entry points.
//! - `pipeline`: `apply_changes`, its `Phase`s and the idle housekeeping pass.
//! - `repaint`: repaint and clear handlers.
//! - `env_rects`: environment highlight rectangles from the caret path.
//! - `headless`: in-memory collaborators.
//! - `runtime`: the async event loop driving one surface.

pub mod collab;
pub mod env_rects;
pub mod headless;
pub mod pipeline;
pub mod repaint;
pub mod runtime;
pub mod surface;

pub use collab::{Document, NodeKind, TreePath, Window};
pub use env_rects::{compute_env_rects, symmetric_difference};
pub use headless::{DrawOp, HeadlessDocument, HeadlessWindow, LayoutCounters, RecordingDevice};
pub use pipeline::{ApplyOutcome, ApplyReport, Pass, Phase};
pub use repaint::RepaintReport;
pub use runtime::{LoopControl, RunSummary, ShutdownReason, SurfaceRuntime};
pub use surface::{EditSurface, SHRINKING_FACTOR};
