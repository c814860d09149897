//! Coalesced apply pipeline.
//!
//! `apply_changes` is the once-per-tick entry point. It drains the pending
//! `ChangeSet` into a `Pass` and runs the named phases of `Phase::ORDER`,
//! each gated on its trigger bits and handing the updated `Pass` to the next.
//! Phases never re-read the aggregator, so notifications raised by
//! collaborators mid-pass cannot re-trigger a phase of the same pass.
//!
//! Phase order (later phases depend on state established earlier):
//! 1. `AutomaticSize`  page size from the window size; adds `ENVIRONMENT`.
//! 2. `PreInvalidateSelection`  damage the old selection before layout moves it.
//! 3. `Environment`  typeset the preamble.
//! 4. `Tree`  retypeset, collapse the selection in normal mode, damage extents.
//! 5. `Extents`  propagate the bounding box to the window.
//! 6. `Cursor`  caret position, scroll into view, old + new caret damage,
//!    environment highlight damage.
//! 7. `Selection`  recompute and damage selection outlines.
//! 8. `EnvironmentWide`  full-surface redraw.
//!
//! Exit: damage is flushed to the window in one batch, the aggregator is
//! empty, and `last_update == last_change - 1` (applied, housekeeping owed).
//!
//! With nothing pending the pass is an idle check instead: once the
//! quiescence interval has elapsed since the last change, the window has
//! been repainted, no event is in flight and the surface has focus,
//! housekeeping runs once and sets `last_update == last_change`.
//!
//! Fatal preconditions: calling this while a repaint is in progress, from
//! within a pass, or with changes pending on a detached window.

use crate::collab::{Document, Window};
use crate::env_rects::{compute_env_rects, outline, symmetric_difference};
use crate::surface::EditSurface;
use core_geometry::Rect;
use core_render::{Damage, Viewport};
use core_session::SessionTransport;
use core_state::env::{MEDIUM_AUTOMATIC, PAGE_HEIGHT, PAGE_MEDIUM, PAGE_WIDTH};
use core_state::{ChangeSet, InputMode};
use std::time::Instant;
use tracing::{debug, error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AutomaticSize,
    PreInvalidateSelection,
    Environment,
    Tree,
    Extents,
    Cursor,
    Selection,
    EnvironmentWide,
}

impl Phase {
    pub const ORDER: [Phase; 8] = [
        Phase::AutomaticSize,
        Phase::PreInvalidateSelection,
        Phase::Environment,
        Phase::Tree,
        Phase::Extents,
        Phase::Cursor,
        Phase::Selection,
        Phase::EnvironmentWide,
    ];

    /// Change categories that activate this phase.
    pub fn trigger(self) -> ChangeSet {
        use ChangeSet as C;
        match self {
            Phase::AutomaticSize => C::AUTOMATIC_SIZE,
            Phase::PreInvalidateSelection => C::TREE | C::ENVIRONMENT | C::SELECTION,
            Phase::Environment => C::ENVIRONMENT,
            Phase::Tree => C::TREE | C::ENVIRONMENT,
            Phase::Extents => C::TREE | C::ENVIRONMENT | C::EXTENTS,
            Phase::Cursor => C::TREE | C::ENVIRONMENT | C::EXTENTS | C::CURSOR | C::FOCUS,
            Phase::Selection => C::SELECTION,
            Phase::EnvironmentWide => C::ENVIRONMENT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Phase::AutomaticSize => "automatic_size",
            Phase::PreInvalidateSelection => "pre_invalidate_selection",
            Phase::Environment => "environment",
            Phase::Tree => "tree",
            Phase::Extents => "extents",
            Phase::Cursor => "cursor",
            Phase::Selection => "selection",
            Phase::EnvironmentWide => "environment_wide",
        }
    }
}

/// State threaded through the phases of one pass.
#[derive(Debug, Clone, Default)]
pub struct Pass {
    /// Categories in effect; only `AutomaticSize` may widen it.
    pub changes: ChangeSet,
    /// Extents produced by the `Tree` phase.
    pub extents: Option<Rect>,
    pub scrolled: bool,
    pub ran: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing pending, housekeeping not due.
    Idle,
    /// Nothing pending, idle housekeeping ran.
    Housekeeping,
    Applied,
}

#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub outcome: ApplyOutcome,
    pub changes: ChangeSet,
    pub phases: Vec<Phase>,
    /// Device-space damage flushed to the window.
    pub damage: Damage,
    pub scrolled: bool,
}

impl ApplyReport {
    fn idle(outcome: ApplyOutcome) -> Self {
        Self {
            outcome,
            changes: ChangeSet::empty(),
            phases: Vec::new(),
            damage: Damage::None,
            scrolled: false,
        }
    }
}

impl<D: Document, W: Window, T: SessionTransport> EditSurface<D, W, T> {
    pub fn apply_changes(&mut self) -> ApplyReport {
        if self.repainting {
            error!(target: "surface.apply", "apply_during_repaint");
            panic!("apply_changes called while a repaint is in progress");
        }
        if self.applying {
            error!(target: "surface.apply", "apply_reentered");
            panic!("apply_changes re-entered during an apply pass");
        }
        if self.changes.is_empty() {
            return self.idle_pass();
        }
        if !self.win.attached() {
            error!(target: "surface.apply", pending = ?self.changes.pending(), "apply_detached");
            panic!("apply_changes with pending changes on a detached window");
        }

        self.applying = true;
        let started = Instant::now();
        let mut pass = Pass {
            changes: self.changes.take(),
            ..Pass::default()
        };
        let requested = pass.changes;
        for phase in Phase::ORDER {
            if !pass.changes.intersects(phase.trigger()) {
                continue;
            }
            trace!(target: "surface.apply", phase = phase.name(), "phase_start");
            pass = self.run_phase(phase, pass);
            pass.ran.push(phase);
        }

        let stray = self.changes.take();
        if !stray.is_empty() {
            debug!(target: "surface.apply", ?stray, "changes_raised_during_pass_dropped");
        }

        let marks = self.damage.marks();
        let damage = self.damage.take();
        self.flush_damage(&damage);
        let now = self.now();
        self.times.mark_applied(now);
        self.applying = false;

        let elapsed = started.elapsed().as_nanos() as u64;
        self.metrics.record_apply(
            marks,
            damage.rects().len() as u64,
            damage.is_all(),
            elapsed,
        );
        debug!(
            target: "surface.apply",
            changes = ?requested,
            phases = pass.ran.len(),
            damaged_rects = damage.rects().len(),
            full = damage.is_all(),
            scrolled = pass.scrolled,
            "apply_pass"
        );
        ApplyReport {
            outcome: ApplyOutcome::Applied,
            changes: pass.changes,
            phases: pass.ran,
            damage,
            scrolled: pass.scrolled,
        }
    }

    fn idle_pass(&mut self) -> ApplyReport {
        let now = self.now();
        let due = self.times.idle_due(now, self.tuning.idle_debounce_ms)
            && self.win.repainted()
            && !self.win.event_pending()
            && self.got_focus;
        if !due {
            return ApplyReport::idle(ApplyOutcome::Idle);
        }
        self.doc.lazy_refresh();
        self.win.refresh_chrome();
        self.win.set_footer(self.message.as_ref());
        self.update_connection();
        self.times.mark_settled();
        self.metrics.record_idle();
        debug!(target: "surface.apply", now, "idle_housekeeping");
        ApplyReport::idle(ApplyOutcome::Housekeeping)
    }

    fn flush_damage(&mut self, damage: &Damage) {
        match damage {
            Damage::None => {}
            Damage::All => self.win.invalidate_all(),
            Damage::Region(rs) => {
                for r in rs {
                    self.win.invalidate(*r);
                }
            }
        }
    }

    fn run_phase(&mut self, phase: Phase, pass: Pass) -> Pass {
        match phase {
            Phase::AutomaticSize => self.automatic_size(pass),
            Phase::PreInvalidateSelection => self.pre_invalidate_selection(pass),
            Phase::Environment => {
                self.doc.typeset_preamble();
                pass
            }
            Phase::Tree => self.retypeset(pass),
            Phase::Extents => {
                let extents = pass.extents.unwrap_or_else(|| self.doc.extents());
                self.set_extents(&extents);
                pass
            }
            Phase::Cursor => self.update_cursor(pass),
            Phase::Selection => self.update_selection(pass),
            Phase::EnvironmentWide => {
                self.damage.mark_all();
                pass
            }
        }
    }

    fn automatic_size(&mut self, mut pass: Pass) -> Pass {
        if self.doc.init_string(PAGE_MEDIUM) != MEDIUM_AUTOMATIC {
            return pass;
        }
        if !self.win.attached() {
            error!(target: "surface.apply", "automatic_size_detached");
            panic!("automatic page sizing requires an attached window");
        }
        let (wx, wy) = self.win.size();
        let f = self.scaler.factor();
        let margin = self.tuning.automatic_size_margin * self.scaler.base_pixel();
        let width = (wx - margin) * f;
        let height = wy * f;
        self.doc.init_env(PAGE_WIDTH, format!("{width}unit"));
        self.doc.init_env(PAGE_HEIGHT, format!("{height}unit"));
        debug!(target: "surface.apply", width, height, "automatic_page_size");
        pass.changes |= ChangeSet::ENVIRONMENT;
        pass
    }

    fn pre_invalidate_selection(&mut self, pass: Pass) -> Pass {
        if self.selection.made_selection {
            self.damage
                .mark_doc_set(&self.selection.rects, &self.scaler);
        }
        pass
    }

    fn retypeset(&mut self, mut pass: Pass) -> Pass {
        self.doc.typeset_invalidate_env();
        if self.input_mode == InputMode::Normal {
            self.selection.made_selection = false;
            self.doc.collapse_selection();
        }
        self.selection.rects = core_geometry::Rects::new();
        let extents = self.doc.typeset();
        let p2 = 2 * self.pixel();
        self.damage.mark_doc(&extents.thicken(p2, p2), &self.scaler);
        self.ghost = self.doc.check_cursor();
        pass.extents = Some(extents);
        pass
    }

    fn update_cursor(&mut self, mut pass: Pass) -> Pass {
        use ChangeSet as C;
        let pixel = self.pixel();
        self.doc.go_to_here();
        if pass
            .changes
            .intersects(C::TREE | C::ENVIRONMENT | C::EXTENTS | C::CURSOR)
        {
            pass.scrolled |= self.ensure_cursor_visible();
        }

        let cu = self.doc.cursor();
        let ocr = self.oc.damage_outline(pixel);
        let ncr = cu.damage_outline(pixel);
        self.copy_always.push(ocr);
        self.copy_always.push(ncr);
        // only a repaint drains it; keep it a minimal cover in between
        self.copy_always = self.copy_always.simplify();
        self.damage.mark_doc(&ocr, &self.scaler);
        self.damage.mark_doc(&ncr, &self.scaler);
        self.oc = cu;

        let fresh = compute_env_rects(&self.doc, pixel);
        let old = std::mem::replace(&mut self.env_rects, fresh);
        if pass.changes.contains(C::FOCUS) {
            self.damage.mark_doc_set(&old, &self.scaler);
            self.damage.mark_doc_set(&self.env_rects, &self.scaler);
        } else if old != self.env_rects {
            let changed = symmetric_difference(&old, &self.env_rects);
            self.damage.mark_doc_set(&changed, &self.scaler);
        }
        pass
    }

    /// Recenter on the caret when it left the visible region. Requests a
    /// full redraw when scrolling.
    pub fn ensure_cursor_visible(&mut self) -> bool {
        let vp = Viewport::new(self.visible());
        let Some((x, top)) = vp.cursor_target(&self.doc.cursor(), self.pixel()) else {
            return false;
        };
        self.scroll_to(x, top);
        self.damage.mark_all();
        self.metrics.record_scroll();
        debug!(target: "surface.viewport", x, top, "cursor_scroll");
        true
    }

    fn update_selection(&mut self, pass: Pass) -> Pass {
        let made = self.doc.selection_active_any();
        self.selection.made_selection = made;
        if made {
            self.selection.table_selection = self.doc.selection_active_table();
            self.selection.rects = outline(&self.doc.selection_rects(), self.pixel());
            self.damage
                .mark_doc_set(&self.selection.rects, &self.scaler);
        }
        pass
    }
}
