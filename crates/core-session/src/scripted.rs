//! In-memory transport with scripted backend behavior.
//!
//! Used by tests and the replay tool in place of real interpreter processes.
//! Each registered backend name carries a `BackendScript` template applied to
//! every session started under that name.
//!
//! Session model:
//! * `start` puts the session in `WaitingForInput` (or fails per script).
//! * `write` records the payload, optionally echoes it to the output queue,
//!   and moves to `WaitingForOutput`.
//! * `read` drains one channel. Once both queues are empty and the session is
//!   not held, the status settles to `BackendScript::settle`.
//! * `hold` keeps a computation running (reads return nothing, status stays
//!   `WaitingForOutput`) until released or interrupted.

use crate::transport::{Channel, SessionId, SessionStatus, SessionTransport, TransportError};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct BackendScript {
    /// Copy each input to the output channel.
    pub echo: bool,
    /// Status adopted once a computation's output has been fully read.
    pub settle: SessionStatus,
    /// Whether `interrupt` aborts a running computation.
    pub honors_interrupt: bool,
    /// When set, every start attempt fails with this reason.
    pub start_failure: Option<String>,
}

impl Default for BackendScript {
    fn default() -> Self {
        Self {
            echo: true,
            settle: SessionStatus::WaitingForInput,
            honors_interrupt: true,
            start_failure: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ScriptedSession {
    pub status: SessionStatus,
    pub output: VecDeque<String>,
    pub error: VecDeque<String>,
    pub written: Vec<String>,
    pub hold: bool,
    pub starts: usize,
    pub restarts: usize,
    pub interrupts: usize,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    backends: HashMap<String, BackendScript>,
    sessions: HashMap<SessionId, ScriptedSession>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make backend `name` available with the given behavior.
    pub fn register(&mut self, name: impl Into<String>, script: BackendScript) {
        self.backends.insert(name.into(), script);
    }

    pub fn script_mut(&mut self, name: &str) -> Option<&mut BackendScript> {
        self.backends.get_mut(name)
    }

    pub fn session(&self, id: &SessionId) -> Option<&ScriptedSession> {
        self.sessions.get(id)
    }

    pub fn session_mut(&mut self, id: &SessionId) -> &mut ScriptedSession {
        self.sessions.entry(id.clone()).or_default()
    }

    pub fn push_output(&mut self, id: &SessionId, data: impl Into<String>) {
        self.session_mut(id).output.push_back(data.into());
    }

    pub fn push_error(&mut self, id: &SessionId, data: impl Into<String>) {
        self.session_mut(id).error.push_back(data.into());
    }

    pub fn set_hold(&mut self, id: &SessionId, hold: bool) {
        self.session_mut(id).hold = hold;
    }

    /// Force a status, e.g. to simulate the backend process dying.
    pub fn set_status(&mut self, id: &SessionId, status: SessionStatus) {
        self.session_mut(id).status = status;
    }

    fn settle_if_drained(&mut self, id: &SessionId) {
        let settle = self
            .backends
            .get(&id.name)
            .map(|b| b.settle)
            .unwrap_or(SessionStatus::Dead);
        if let Some(s) = self.sessions.get_mut(id)
            && s.status == SessionStatus::WaitingForOutput
            && !s.hold
            && s.output.is_empty()
            && s.error.is_empty()
        {
            s.status = settle;
        }
    }
}

impl SessionTransport for ScriptedTransport {
    fn start(&mut self, id: &SessionId, restart: bool) -> Result<SessionStatus, TransportError> {
        let Some(script) = self.backends.get(&id.name) else {
            return Err(TransportError::Unavailable {
                name: id.name.clone(),
            });
        };
        if let Some(reason) = &script.start_failure {
            return Err(TransportError::StartFailed {
                name: id.name.clone(),
                reason: reason.clone(),
            });
        }
        let s = self.sessions.entry(id.clone()).or_default();
        s.status = SessionStatus::WaitingForInput;
        s.hold = false;
        s.output.clear();
        s.error.clear();
        s.starts += 1;
        if restart {
            s.restarts += 1;
        }
        Ok(s.status)
    }

    fn write(&mut self, id: &SessionId, payload: &str) {
        let echo = self.backends.get(&id.name).is_some_and(|b| b.echo);
        let s = self.session_mut(id);
        s.written.push(payload.to_string());
        if echo {
            s.output.push_back(payload.to_string());
        }
        s.status = SessionStatus::WaitingForOutput;
    }

    fn read(&mut self, id: &SessionId, channel: Channel) -> String {
        let data = match self.sessions.get_mut(id) {
            Some(s) if !s.hold => {
                let queue = match channel {
                    Channel::Output => &mut s.output,
                    Channel::Error => &mut s.error,
                };
                queue.drain(..).collect::<String>()
            }
            _ => String::new(),
        };
        self.settle_if_drained(id);
        data
    }

    fn interrupt(&mut self, id: &SessionId) {
        let honors = self.backends.get(&id.name).is_some_and(|b| b.honors_interrupt);
        let s = self.session_mut(id);
        s.interrupts += 1;
        if honors && s.status == SessionStatus::WaitingForOutput {
            s.hold = false;
            s.output.clear();
            s.error.clear();
            s.status = SessionStatus::WaitingForInput;
        }
    }

    fn stop(&mut self, id: &SessionId) {
        let s = self.session_mut(id);
        s.hold = false;
        s.output.clear();
        s.error.clear();
        s.status = SessionStatus::Dead;
    }

    fn status(&self, id: &SessionId) -> SessionStatus {
        self.sessions.get(id).map(|s| s.status).unwrap_or_default()
    }
}
