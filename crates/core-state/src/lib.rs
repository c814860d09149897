//! Editing-surface state shared by the apply pipeline, the repaint handlers
//! and the session protocol.
//!
//! Everything here is per-surface: there is no process-wide change mask, so
//! independent surfaces never observe each other's pending changes.
//!
//! Modules:
//! - `changes`: `ChangeSet` bitmask + `ChangeAggregator` (notify / has / take).
//! - `timing`: `UpdateTimes` (last_change / last_update) and clock sources.
//! - `cursor`: `ShadowCursor` caret snapshots and their damage outline.
//! - `selection`: `SelectionState` derived per apply pass.
//! - `mode`: typesetting mode (`EditMode`) and interaction mode (`InputMode`).
//! - `message`: footer status messages.
//! - `env`: environment variable names consumed from the document.

pub mod changes;
pub mod cursor;
pub mod env;
pub mod message;
pub mod mode;
pub mod selection;
pub mod timing;

pub use changes::{ChangeAggregator, ChangeSet};
pub use cursor::ShadowCursor;
pub use message::{MessageLevel, StatusMessage};
pub use mode::{EditMode, InputMode, InvalidMode, language_variable};
pub use selection::SelectionState;
pub use timing::{Clock, ManualClock, Millis, MonotonicClock, UpdateTimes};
