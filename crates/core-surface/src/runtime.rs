//! Async driver for one editing surface.
//!
//! A single control task owns the surface and consumes `Event`s from the
//! bounded channel. Background sources (tick, session poll) are spawned from
//! an `EventSourceRegistry` and only ever send; all surface mutation happens
//! here. Every `Tick` runs the apply entry point once. Repaint requests apply
//! pending changes first so the repaint never sees a torn state.

use crate::collab::{Document, Window};
use crate::pipeline::{ApplyOutcome, ApplyReport};
use crate::surface::EditSurface;
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventHooks, EventSourceRegistry, NoopEventHooks, SessionCommand,
    WindowEvent,
};
use core_session::SessionTransport;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts of what the loop did, returned when it stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub events: u64,
    pub applies: u64,
    pub housekeeping: u64,
    pub repaints: u64,
}

pub struct SurfaceRuntime<D: Document, W: Window, T: SessionTransport> {
    surface: EditSurface<D, W, T>,
    hooks: Box<dyn EventHooks>,
    registry: EventSourceRegistry,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<JoinHandle<()>>,
    summary: RunSummary,
    last_apply: Option<ApplyReport>,
}

impl<D: Document, W: Window, T: SessionTransport> SurfaceRuntime<D, W, T> {
    pub fn new(surface: EditSurface<D, W, T>, registry: EventSourceRegistry) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        Self {
            surface,
            hooks: Box::new(NoopEventHooks),
            registry,
            rx,
            tx: Some(tx),
            source_handles: Vec::new(),
            summary: RunSummary::default(),
            last_apply: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Box<dyn EventHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sender for producers outside the registry (window layer, mutators).
    /// `None` once the loop has started shutting down.
    pub fn sender(&self) -> Option<mpsc::Sender<Event>> {
        self.tx.clone()
    }

    pub fn surface(&self) -> &EditSurface<D, W, T> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut EditSurface<D, W, T> {
        &mut self.surface
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Report of the most recent apply pass that did something.
    pub fn take_last_apply(&mut self) -> Option<ApplyReport> {
        self.last_apply.take()
    }

    /// Handle one event synchronously.
    pub fn dispatch(&mut self, event: &Event) -> LoopControl {
        self.summary.events += 1;
        match event {
            Event::Window(w) => self.handle_window(w),
            Event::Session(cmd) => self.handle_session(cmd),
            Event::Changed(changes) => self.surface.notify(*changes),
            Event::Tick => {
                let report = self.surface.apply_changes();
                self.record(report);
            }
            Event::Shutdown => return LoopControl::Break,
        }
        LoopControl::Continue
    }

    fn record(&mut self, report: ApplyReport) {
        match report.outcome {
            ApplyOutcome::Applied => self.summary.applies += 1,
            ApplyOutcome::Housekeeping => self.summary.housekeeping += 1,
            ApplyOutcome::Idle => return,
        }
        self.last_apply = Some(report);
    }

    fn handle_window(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::Resize { width, height } => {
                debug!(target: "runtime", width, height, "resize");
                self.surface.handle_resize();
            }
            WindowEvent::Repaint { region } => {
                if !self.surface.pending().is_empty() {
                    let report = self.surface.apply_changes();
                    self.record(report);
                }
                let report = self.surface.handle_repaint(*region);
                self.summary.repaints += 1;
                if report.interrupted {
                    trace!(target: "runtime", "repaint_interrupted");
                }
            }
            WindowEvent::Clear { region } => self.surface.handle_clear(*region),
            WindowEvent::SetInteger { which, value } => {
                if !self.surface.handle_set_integer(which, *value) {
                    warn!(target: "runtime", which = which.as_str(), value, "set_integer_ignored");
                }
            }
            WindowEvent::FocusGained => self.surface.resume(),
            WindowEvent::FocusLost => self.surface.suspend(),
            WindowEvent::FullScreen(flag) => self.surface.set_full_screen(*flag),
        }
    }

    fn handle_session(&mut self, cmd: &SessionCommand) {
        match cmd {
            SessionCommand::Connect => self.surface.connect(),
            SessionCommand::Feed(payload) => {
                if self.surface.busy_connection() {
                    debug!(target: "runtime", "feed_while_busy_ignored");
                } else {
                    self.surface.feed_input(payload);
                }
            }
            SessionCommand::Poll => self.surface.process_session_output(),
            SessionCommand::Interrupt => {
                self.surface.interrupt_connection();
            }
            SessionCommand::Stop => {
                self.surface.stop_connection();
            }
        }
    }

    /// Spawn the registered sources and consume events until `Shutdown` or
    /// until every sender is gone. Returns the surface and a summary.
    pub async fn run(mut self) -> (EditSurface<D, W, T>, RunSummary) {
        if let Some(tx) = self.tx.as_ref() {
            self.source_handles = self.registry.spawn_all(tx);
        }
        info!(target: "runtime", sources = self.source_handles.len(), "event_loop_start");

        let mut reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            self.hooks.pre_handle(&event);
            if self.dispatch(&event) == LoopControl::Break {
                reason = ShutdownReason::ShutdownEvent;
                break;
            }
            self.hooks.post_handle(&event);
        }

        self.rx.close();
        self.finalize_shutdown(reason).await;
        (self.surface, self.summary)
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        info!(target: "runtime.shutdown", reason = reason.as_str(), stage = "begin", "shutdown_stage");
        if let Some(tx) = self.tx.take() {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "dropping_runtime_sender");
            drop(tx);
        }

        if self.surface.window().attached() {
            let report = self.surface.apply_changes();
            self.record(report);
        } else if !self.surface.pending().is_empty() {
            warn!(
                target: "runtime.shutdown",
                pending = ?self.surface.pending(),
                "pending_changes_dropped_detached"
            );
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(target: "runtime.shutdown", "event_source_task_stopped"),
                Ok(Err(err)) if err.is_cancelled() => {
                    trace!(target: "runtime.shutdown", "event_source_task_cancelled")
                }
                Ok(Err(err)) => error!(target: "runtime.shutdown", ?err, "event_source_task_error"),
                Err(_) => warn!(target: "runtime.shutdown", "event_source_task_timeout"),
            }
        }
        info!(
            target: "runtime.shutdown",
            reason = reason.as_str(),
            stage = "complete",
            events = self.summary.events,
            applies = self.summary.applies,
            "shutdown_stage"
        );
    }
}
