//! Event types and async event sources for the surface event loop.
//!
//! Everything that can happen to an editing surface arrives as an `Event`
//! on one bounded channel consumed by a single control task: window-manager
//! requests, session commands, notifications from document mutators, and
//! periodic ticks that drive the apply entry point.

use core_geometry::Rect;
use core_state::ChangeSet;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Producers await `send`; events are never
// dropped while the consumer is alive.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Window(WindowEvent),
    Session(SessionCommand),
    /// A document mutator changed state the surface must re-apply.
    Changed(ChangeSet),
    /// Periodic tick; the loop runs the apply entry point once per tick.
    Tick,
    Shutdown,
}

/// Requests from the window layer. Regions are in device coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    Resize { width: i64, height: i64 },
    Repaint { region: Rect },
    Clear { region: Rect },
    SetInteger { which: String, value: i64 },
    FocusGained,
    FocusLost,
    FullScreen(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Connect,
    Feed(String),
    /// The backend may have produced output.
    Poll,
    Interrupt,
    Stop,
}

// -------------------------------------------------------------------------------------------------
// Event Transform Hooks
// -------------------------------------------------------------------------------------------------
/// Optional hooks that observe events at the loop boundary. They must not block.
pub trait EventHooks: Send + Sync + 'static {
    fn pre_handle(&self, _event: &Event) {}
    fn post_handle(&self, _event: &Event) {}
}

/// Default no-op hooks implementation.
pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Each source owns one background task pushing `Event`s into the shared channel and terminates
// promptly once a send fails (consumer dropped).

/// Trait implemented by any async event producer.
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier used for logging.
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task. Implementors stop when
    /// `tx.send(..).await` returns Err and avoid busy loops by awaiting timers.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// `Sender` clone; the registry keeps none. During shutdown the caller drops its last
    /// `Sender` before awaiting the handles so sources observe the closed channel.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        // Drain so a second call cannot spawn duplicates.
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning_event_source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

fn record_send_failure(source: &'static str) {
    tracing::debug!(target: "runtime.events", source, "event_source_channel_closed");
}

/// Emits `Event::Tick` every interval; drives the apply entry point.
pub struct TickEventSource {
    interval: Duration,
}

impl TickEventSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            loop {
                interval.tick().await;
                if tx.send(Event::Tick).await.is_err() {
                    record_send_failure("tick");
                    break;
                }
            }
        })
    }
}

/// Emits `SessionCommand::Poll` every interval so backend output is picked
/// up without a dedicated listener.
pub struct SessionPollSource {
    interval: Duration,
}

impl SessionPollSource {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl AsyncEventSource for SessionPollSource {
    fn name(&self) -> &'static str {
        "session_poll"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            loop {
                interval.tick().await;
                if tx.send(Event::Session(SessionCommand::Poll)).await.is_err() {
                    record_send_failure("session_poll");
                    break;
                }
            }
        })
    }
}
