//! Session protocol state machine.
//!
//! States: `Dead`, `WaitingForInput`, `WaitingForOutput`. Every entry point
//! receives a freshly resolved `SessionId` (see `resolve_identity`) and
//! re-reads the status from the transport before acting, so a backend switch
//! through the environment is picked up instead of acting on a stale session.
//!
//! The protocol never touches the document directly. Each call returns the
//! `SessionEffect`s the surface must apply: status messages, insertions of
//! output/error payloads (which the surface treats as tree mutations), and
//! prompt transitions.
//!
//! Failure semantics: an unavailable backend or a failed restart is reported
//! as a message and leaves the session idle. Nothing here is fatal; the worst
//! case is losing the in-flight computation.

use crate::transport::{Channel, SessionId, SessionStatus, SessionTransport};
use core_state::StatusMessage;
use core_state::env::{PROG_LANGUAGE, THIS_SESSION};
use tracing::{debug, info, warn};

/// Payload inserted into the document on behalf of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion {
    Output(String),
    /// Error-channel payload, rendered as a distinguished error block.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    Message(StatusMessage),
    Insert(Insertion),
    /// Return the surface to the input prompt.
    EnterInput,
    /// Start polling for output.
    EnterOutput,
}

/// Session identity from the environment lookup `env`.
pub fn resolve_identity(env: impl Fn(&str) -> String) -> SessionId {
    SessionId::new(env(PROG_LANGUAGE), env(THIS_SESSION))
}

fn running(id: &SessionId) -> StatusMessage {
    StatusMessage::info(format!("{} is running...", id.name), session_detail(id))
}

fn session_detail(id: &SessionId) -> String {
    format!("session `{}`", id.session)
}

#[derive(Debug, Default)]
pub struct Session {
    id: SessionId,
    status: SessionStatus,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Last resolved status (call `refresh` for an up-to-date value).
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Adopt `id` and re-read its status.
    pub fn refresh<T: SessionTransport + ?Sized>(
        &mut self,
        id: SessionId,
        transport: &T,
    ) -> SessionStatus {
        if id != self.id {
            debug!(target: "session", from = %self.id, to = %id, "session_switch");
        }
        self.id = id;
        self.status = transport.status(&self.id);
        self.status
    }

    pub fn connect<T: SessionTransport + ?Sized>(
        &mut self,
        id: SessionId,
        transport: &mut T,
    ) -> Vec<SessionEffect> {
        self.refresh(id, transport);
        let mut fx = Vec::new();
        match transport.start(&self.id, false) {
            Ok(_) => {
                info!(target: "session", id = %self.id, "session_connect");
                fx.push(SessionEffect::Message(running(&self.id)));
            }
            Err(e) => {
                warn!(target: "session", id = %self.id, error = %e, "session_connect_failed");
                fx.push(SessionEffect::Message(StatusMessage::error(
                    e.to_string(),
                    format!("connect {}", self.id.name),
                )));
            }
        }
        self.status = transport.status(&self.id);
        match self.status {
            SessionStatus::WaitingForInput => fx.push(SessionEffect::EnterInput),
            SessionStatus::WaitingForOutput => fx.push(SessionEffect::EnterOutput),
            SessionStatus::Dead => {}
        }
        fx
    }

    /// Submit input. A dead session is restarted first (with a warning); a
    /// busy session ignores the call, callers guard with `busy`.
    pub fn feed<T: SessionTransport + ?Sized>(
        &mut self,
        id: SessionId,
        transport: &mut T,
        payload: &str,
    ) -> Vec<SessionEffect> {
        self.refresh(id, transport);
        let mut fx = Vec::new();
        match self.status {
            SessionStatus::WaitingForInput => {
                transport.write(&self.id, payload);
                self.status = SessionStatus::WaitingForOutput;
                debug!(target: "session", id = %self.id, size_bytes = payload.len(), "session_feed");
            }
            SessionStatus::Dead => match transport.start(&self.id, true) {
                Ok(_) => {
                    transport.write(&self.id, payload);
                    self.status = SessionStatus::WaitingForOutput;
                    warn!(target: "session", id = %self.id, "session_restart");
                    fx.push(SessionEffect::Message(StatusMessage::warning(
                        format!("Warning: {} has been restarted", self.id.name),
                        session_detail(&self.id),
                    )));
                }
                Err(e) => {
                    warn!(target: "session", id = %self.id, error = %e, "session_restart_failed");
                    fx.push(SessionEffect::Message(StatusMessage::error(
                        e.to_string(),
                        format!("connect {}", self.id.name),
                    )));
                    fx.push(SessionEffect::EnterInput);
                }
            },
            SessionStatus::WaitingForOutput => {
                warn!(target: "session", id = %self.id, "feed_while_busy");
            }
        }
        fx
    }

    /// Collect whatever the backend produced since the last poll.
    pub fn poll<T: SessionTransport + ?Sized>(
        &mut self,
        id: SessionId,
        transport: &mut T,
    ) -> Vec<SessionEffect> {
        let mut fx = Vec::new();
        if self.status != SessionStatus::WaitingForOutput {
            return fx;
        }
        if self.refresh(id, transport) != SessionStatus::WaitingForOutput {
            return fx;
        }
        let output = transport.read(&self.id, Channel::Output);
        if !output.is_empty() {
            fx.push(SessionEffect::Insert(Insertion::Output(output)));
            fx.push(SessionEffect::Message(running(&self.id)));
        }
        let error = transport.read(&self.id, Channel::Error);
        if !error.is_empty() {
            fx.push(SessionEffect::Insert(Insertion::Error(error)));
            fx.push(SessionEffect::Message(running(&self.id)));
        }
        self.status = transport.status(&self.id);
        match self.status {
            SessionStatus::Dead => {
                info!(target: "session", id = %self.id, "session_completed");
                fx.push(SessionEffect::EnterInput);
                fx.push(SessionEffect::Message(StatusMessage::info(
                    format!("{} has completed its task", self.id.name),
                    session_detail(&self.id),
                )));
            }
            SessionStatus::WaitingForInput => fx.push(SessionEffect::EnterInput),
            SessionStatus::WaitingForOutput => {}
        }
        fx
    }

    /// True iff the session is computing.
    pub fn busy<T: SessionTransport + ?Sized>(&mut self, id: SessionId, transport: &T) -> bool {
        self.refresh(id, transport) == SessionStatus::WaitingForOutput
    }

    /// Ask the backend to abort the current computation. Returns whether an
    /// interrupt was actually issued.
    pub fn interrupt<T: SessionTransport + ?Sized>(
        &mut self,
        id: SessionId,
        transport: &mut T,
    ) -> bool {
        if self.refresh(id, transport) != SessionStatus::WaitingForOutput {
            return false;
        }
        transport.interrupt(&self.id);
        let after = transport.status(&self.id);
        self.status = after;
        info!(target: "session", id = %self.id, ?after, "session_interrupt");
        true
    }

    /// Terminate the session unless it is already dead.
    pub fn stop<T: SessionTransport + ?Sized>(&mut self, id: SessionId, transport: &mut T) -> bool {
        if self.refresh(id, transport) == SessionStatus::Dead {
            return false;
        }
        transport.stop(&self.id);
        self.status = transport.status(&self.id);
        info!(target: "session", id = %self.id, status = ?self.status, "session_stop");
        true
    }
}
