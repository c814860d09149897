//! Transport seam between the session protocol and whatever actually runs
//! the external backend process.
//!
//! The transport owns the OS process (spawn, pipes, teardown). The protocol
//! only issues requests and reads back the logical status; `interrupt` and
//! `stop` are fire-and-forget, their effect shows up in the next `status`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionStatus {
    #[default]
    Dead,
    WaitingForInput,
    WaitingForOutput,
}

/// Identity of a session: backend name plus session id, both resolved from
/// the document environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SessionId {
    pub name: String,
    pub session: String,
}

impl SessionId {
    pub fn new(name: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            session: session.into(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.session)
    }
}

/// Output channels a backend can produce on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Output,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{name} is not available")]
    Unavailable { name: String },
    #[error("could not start {name}: {reason}")]
    StartFailed { name: String, reason: String },
}

pub trait SessionTransport {
    /// Start (or restart) the backend session. Returns the status right after startup.
    fn start(&mut self, id: &SessionId, restart: bool) -> Result<SessionStatus, TransportError>;
    fn write(&mut self, id: &SessionId, payload: &str);
    /// Drain pending data on `channel`; an empty string means nothing available.
    fn read(&mut self, id: &SessionId, channel: Channel) -> String;
    fn interrupt(&mut self, id: &SessionId);
    fn stop(&mut self, id: &SessionId);
    fn status(&self, id: &SessionId) -> SessionStatus;
}
