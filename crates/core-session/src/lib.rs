//! External computation sessions attached to an editing surface.
//!
//! One `Session` is tracked per surface. Its identity (backend name, session
//! id) is derived from the document environment at every entry point, so
//! changing `prog-language` / `this-session` switches sessions implicitly.
//!
//! - `transport`: the `SessionTransport` seam, status enum, identity, errors.
//! - `protocol`: the `Session` state machine (connect / feed / poll /
//!   interrupt / stop / busy) returning `SessionEffect`s for the surface.
//! - `scripted`: an in-memory transport for tests and headless replay.
//!
//! Concurrency: nothing blocks on the backend. Output availability is
//! discovered by `poll`, which the event loop calls whenever the transport
//! signals data might be ready.

pub mod protocol;
pub mod scripted;
pub mod transport;

pub use protocol::{Insertion, Session, SessionEffect, resolve_identity};
pub use scripted::{BackendScript, ScriptedTransport};
pub use transport::{Channel, SessionId, SessionStatus, SessionTransport, TransportError};
