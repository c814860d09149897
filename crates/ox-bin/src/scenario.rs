//! TOML scenarios replayed against a headless surface.
//!
//! A scenario describes a window, a document and a list of steps. Steps map
//! onto runtime events (`resize`, `focus`, `tick`, `repaint`, session
//! commands) or onto direct document edits followed by the matching
//! notification (`caret`, `select`). The clock is manual: only `tick` steps
//! advance it.
//!
//! ```toml
//! [window]
//! width = 204800   # 800 screen pixels at base_pixel 256
//! height = 153600
//!
//! [document]
//! backends = ["scheme"]
//! prog_language = "scheme"
//!
//! [[step]]
//! op = "focus"
//!
//! [[step]]
//! op = "caret"
//! x = 12800
//! y = -2000000
//! y2 = 10240
//!
//! [[step]]
//! op = "tick"
//! advance_ms = 20
//! ```

use anyhow::Context;
use core_config::SurfaceTuning;
use core_events::{Event, EventSourceRegistry, SessionCommand, WindowEvent};
use core_geometry::{Coord, Rect, Rects};
use core_render::{Damage, SurfaceMetricsSnapshot};
use core_session::{BackendScript, ScriptedTransport};
use core_state::env::{PAGE_MEDIUM, PROG_LANGUAGE, THIS_SESSION};
use core_state::{ChangeSet, ManualClock, ShadowCursor};
use core_surface::{
    ApplyReport, EditSurface, HeadlessDocument, HeadlessWindow, RunSummary, SHRINKING_FACTOR,
    SurfaceRuntime,
};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("step {step}: unknown change category `{name}`")]
    UnknownChange { step: usize, name: String },
    #[error("window size must be positive (got {width}x{height})")]
    InvalidWindow { width: Coord, height: Coord },
    #[error("step {step}: shrink factor must be positive (got {value})")]
    InvalidShrinkFactor { step: usize, value: i64 },
}

/// Window size in device units (`base_pixel` units per screen pixel).
#[derive(Debug, Clone, Deserialize)]
pub struct WindowSpec {
    #[serde(default = "WindowSpec::default_width")]
    pub width: Coord,
    #[serde(default = "WindowSpec::default_height")]
    pub height: Coord,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

impl WindowSpec {
    const fn default_width() -> Coord {
        800 * 256
    }
    const fn default_height() -> Coord {
        600 * 256
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentSpec {
    /// `automatic`, `paper` or `papyrus`; the headless default is `paper`.
    pub medium: Option<String>,
    /// Document bounding box `[x1, y1, x2, y2]`.
    pub extents: Option<[Coord; 4]>,
    #[serde(default)]
    pub prog_language: String,
    #[serde(default)]
    pub session: String,
    /// Backend names the scripted transport accepts.
    #[serde(default)]
    pub backends: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Resize {
        width: Coord,
        height: Coord,
    },
    Focus,
    Blur,
    FullScreen {
        on: bool,
    },
    Caret {
        x: Coord,
        y: Coord,
        #[serde(default)]
        y1: Coord,
        #[serde(default)]
        y2: Coord,
        #[serde(default)]
        slope: f64,
    },
    Select {
        rect: [Coord; 4],
        #[serde(default)]
        table: bool,
    },
    Deselect,
    ShrinkFactor {
        value: i64,
    },
    Notify {
        changes: Vec<String>,
    },
    Connect,
    Feed {
        input: String,
    },
    Poll,
    Interrupt,
    Stop,
    Tick {
        #[serde(default)]
        advance_ms: i64,
    },
    Repaint {
        rect: [Coord; 4],
    },
    Clear {
        rect: [Coord; 4],
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub window: WindowSpec,
    #[serde(default)]
    pub document: DocumentSpec,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(text)?;
        let WindowSpec { width, height } = scenario.window;
        if width <= 0 || height <= 0 {
            return Err(ScenarioError::InvalidWindow { width, height });
        }
        Ok(scenario)
    }
}

pub fn load(path: &Path) -> anyhow::Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario =
        Scenario::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))?;
    info!(target: "replay", path = %path.display(), steps = scenario.steps.len(), "scenario_loaded");
    Ok(scenario)
}

/// One apply pass that did something, tagged with the step that caused it.
#[derive(Debug, Clone)]
pub struct PassRecord {
    pub step: usize,
    pub report: ApplyReport,
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub passes: Vec<PassRecord>,
    pub metrics: SurfaceMetricsSnapshot,
    pub summary: RunSummary,
    /// Footer message at the end of the run.
    pub message: Option<String>,
    pub inserted: usize,
}

type HeadlessRuntime = SurfaceRuntime<HeadlessDocument, HeadlessWindow, ScriptedTransport>;

fn rect(r: &[Coord; 4]) -> Rect {
    Rect::new(r[0], r[1], r[2], r[3])
}

fn parse_changes(step: usize, names: &[String]) -> Result<ChangeSet, ScenarioError> {
    names.iter().try_fold(ChangeSet::empty(), |acc, name| {
        ChangeSet::from_name(&name.to_ascii_uppercase())
            .map(|c| acc | c)
            .ok_or_else(|| ScenarioError::UnknownChange {
                step,
                name: name.clone(),
            })
    })
}

fn build(scenario: &Scenario, tuning: SurfaceTuning, clock: &ManualClock) -> HeadlessRuntime {
    let spec = &scenario.document;
    let mut doc = HeadlessDocument::new();
    if let Some(medium) = &spec.medium {
        doc.set_init(PAGE_MEDIUM, medium.clone());
    }
    if let Some(ext) = &spec.extents {
        doc.set_extents(rect(ext));
    }
    doc.set_env(PROG_LANGUAGE, spec.prog_language.clone());
    doc.set_env(THIS_SESSION, spec.session.clone());

    let mut transport = ScriptedTransport::new();
    for name in &spec.backends {
        transport.register(name.clone(), BackendScript::default());
    }
    let win = HeadlessWindow::new(scenario.window.width, scenario.window.height);
    let surface = EditSurface::with_clock(doc, win, transport, tuning, Box::new(clock.clone()));
    SurfaceRuntime::new(surface, EventSourceRegistry::new())
}

fn run_step(
    rt: &mut HeadlessRuntime,
    clock: &ManualClock,
    index: usize,
    step: &Step,
) -> Result<(), ScenarioError> {
    let event = match step {
        Step::Resize { width, height } => {
            if *width <= 0 || *height <= 0 {
                return Err(ScenarioError::InvalidWindow {
                    width: *width,
                    height: *height,
                });
            }
            rt.surface_mut().window_mut().resize(*width, *height);
            Event::Window(WindowEvent::Resize {
                width: *width,
                height: *height,
            })
        }
        Step::Focus => Event::Window(WindowEvent::FocusGained),
        Step::Blur => Event::Window(WindowEvent::FocusLost),
        Step::FullScreen { on } => Event::Window(WindowEvent::FullScreen(*on)),
        Step::Caret {
            x,
            y,
            y1,
            y2,
            slope,
        } => {
            let cu = ShadowCursor::new(*x, *y, *y1, *y2, *slope, true);
            rt.surface_mut().document_mut().set_caret(cu);
            Event::Changed(ChangeSet::CURSOR)
        }
        Step::Select { rect: r, table } => {
            rt.surface_mut()
                .document_mut()
                .set_selection(Rects::single(rect(r)), *table);
            Event::Changed(ChangeSet::SELECTION)
        }
        Step::Deselect => {
            rt.surface_mut().document_mut().clear_selection();
            Event::Changed(ChangeSet::SELECTION)
        }
        Step::ShrinkFactor { value } => {
            if *value <= 0 {
                return Err(ScenarioError::InvalidShrinkFactor {
                    step: index,
                    value: *value,
                });
            }
            Event::Window(WindowEvent::SetInteger {
                which: SHRINKING_FACTOR.to_string(),
                value: *value,
            })
        }
        Step::Notify { changes } => Event::Changed(parse_changes(index, changes)?),
        Step::Connect => Event::Session(SessionCommand::Connect),
        Step::Feed { input } => Event::Session(SessionCommand::Feed(input.clone())),
        Step::Poll => Event::Session(SessionCommand::Poll),
        Step::Interrupt => Event::Session(SessionCommand::Interrupt),
        Step::Stop => Event::Session(SessionCommand::Stop),
        Step::Tick { advance_ms } => {
            clock.advance(*advance_ms);
            Event::Tick
        }
        Step::Repaint { rect: r } => Event::Window(WindowEvent::Repaint { region: rect(r) }),
        Step::Clear { rect: r } => Event::Window(WindowEvent::Clear { region: rect(r) }),
    };
    debug!(target: "replay", step = index, ?event, "replay_step");
    rt.dispatch(&event);
    Ok(())
}

/// Replay every step, then apply whatever is still pending.
pub fn replay(scenario: &Scenario, tuning: SurfaceTuning) -> Result<Replay, ScenarioError> {
    let clock = ManualClock::new(0);
    let mut rt = build(scenario, tuning, &clock);
    let mut passes = Vec::new();
    for (index, step) in scenario.steps.iter().enumerate() {
        run_step(&mut rt, &clock, index, step)?;
        if let Some(report) = rt.take_last_apply() {
            info!(target: "replay", step = index, line = %describe(&report), "apply_pass");
            passes.push(PassRecord {
                step: index,
                report,
            });
        }
    }
    if !rt.surface().pending().is_empty() {
        rt.dispatch(&Event::Tick);
        if let Some(report) = rt.take_last_apply() {
            passes.push(PassRecord {
                step: scenario.steps.len(),
                report,
            });
        }
    }
    let surface = rt.surface();
    Ok(Replay {
        passes,
        metrics: surface.metrics(),
        summary: rt.summary().clone(),
        message: surface.message().map(ToString::to_string),
        inserted: surface.document().inserted.len(),
    })
}

fn describe_damage(d: &Damage) -> String {
    match d {
        Damage::None => "none".to_string(),
        Damage::All => "all".to_string(),
        Damage::Region(rs) => format!("{} rects, area {}", rs.len(), rs.area()),
    }
}

/// One-line summary of an apply pass.
pub fn describe(report: &ApplyReport) -> String {
    let phases: Vec<&str> = report.phases.iter().map(|p| p.name()).collect();
    format!(
        "{:?} changes={:?} phases=[{}] damage={}{}",
        report.outcome,
        report.changes,
        phases.join(","),
        describe_damage(&report.damage),
        if report.scrolled { " scrolled" } else { "" }
    )
}

pub fn write_report(replay: &Replay, out: &mut impl Write) -> std::io::Result<()> {
    for pass in &replay.passes {
        writeln!(out, "step {:>3}: {}", pass.step, describe(&pass.report))?;
    }
    let m = &replay.metrics;
    writeln!(
        out,
        "applies={} idle={} full={} rects={} repaints={} interrupted={} scrolls={}",
        m.apply_passes,
        m.idle_passes,
        m.full_invalidations,
        m.damaged_rects,
        m.repaints,
        m.interrupted_repaints,
        m.scroll_into_view
    )?;
    if let Some(msg) = &replay.message {
        writeln!(out, "message: {msg}")?;
    }
    Ok(())
}
