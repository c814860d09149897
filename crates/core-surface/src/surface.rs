//! The editing surface: state shared by the apply pipeline, the window
//! handlers and the session entry points.
//!
//! All mutation happens on one control thread. Mutators (`notify`, the
//! window handlers, session effects) only record change categories; the
//! pipeline (`apply_changes`, see `pipeline`) consumes them once per tick.

use crate::collab::{Document, Window};
use core_config::SurfaceTuning;
use core_geometry::{Coord, Rect, Rects, Scaler};
use core_render::{DamageTracker, SurfaceMetrics, SurfaceMetricsSnapshot, VisibilityPolicy};
use core_session::{Session, SessionEffect, SessionId, SessionTransport, resolve_identity};
use core_state::env::{MEDIUM_AUTOMATIC, MODE, PAGE_MEDIUM, SFACTOR};
use core_state::{
    ChangeAggregator, ChangeSet, Clock, InputMode, MonotonicClock, SelectionState, ShadowCursor,
    StatusMessage, UpdateTimes, language_variable,
};
use tracing::{debug, error, info, warn};

/// Integer property name carrying the shrink factor.
pub const SHRINKING_FACTOR: &str = "shrinking factor";

pub struct EditSurface<D: Document, W: Window, T: SessionTransport> {
    pub(crate) doc: D,
    pub(crate) win: W,
    pub(crate) transport: T,
    pub(crate) changes: ChangeAggregator,
    pub(crate) times: UpdateTimes,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) scaler: Scaler,
    pub(crate) tuning: SurfaceTuning,
    pub(crate) session: Session,
    pub(crate) selection: SelectionState,
    /// Caret outline drawn last ("old cursor").
    pub(crate) oc: ShadowCursor,
    /// Caret snapshot validated after the last retypeset.
    pub(crate) ghost: ShadowCursor,
    pub(crate) env_rects: Rects,
    /// Caret outlines to copy to the screen on the next repaint.
    pub(crate) copy_always: Rects,
    pub(crate) got_focus: bool,
    pub(crate) full_screen: bool,
    pub(crate) input_mode: InputMode,
    pub(crate) applying: bool,
    pub(crate) repainting: bool,
    pub(crate) message: Option<StatusMessage>,
    /// Cached selection endpoint for `ensure_selection_endpoint_visible`.
    pub(crate) selection_end: Option<(Coord, Coord)>,
    pub(crate) damage: DamageTracker,
    pub(crate) metrics: SurfaceMetrics,
}

impl<D: Document, W: Window, T: SessionTransport> EditSurface<D, W, T> {
    pub fn new(doc: D, win: W, transport: T, tuning: SurfaceTuning) -> Self {
        Self::with_clock(doc, win, transport, tuning, Box::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        doc: D,
        win: W,
        transport: T,
        tuning: SurfaceTuning,
        clock: Box<dyn Clock>,
    ) -> Self {
        let now = clock.now_ms();
        Self {
            doc,
            win,
            transport,
            changes: ChangeAggregator::new(),
            times: UpdateTimes::new(now),
            clock,
            scaler: Scaler::new(tuning.shrink_factor, tuning.base_pixel),
            tuning,
            session: Session::new(),
            selection: SelectionState::default(),
            oc: ShadowCursor::at(0, 0),
            ghost: ShadowCursor::at(0, 0),
            env_rects: Rects::new(),
            copy_always: Rects::new(),
            got_focus: false,
            full_screen: false,
            input_mode: InputMode::Normal,
            applying: false,
            repainting: false,
            message: None,
            selection_end: None,
            damage: DamageTracker::new(),
            metrics: SurfaceMetrics::default(),
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------------------------------

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Mutable document access for mutators; callers `notify` what they changed.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn window(&self) -> &W {
        &self.win
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.win
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn pixel(&self) -> Coord {
        self.scaler.pixel()
    }

    pub fn tuning(&self) -> &SurfaceTuning {
        &self.tuning
    }

    pub fn times(&self) -> UpdateTimes {
        self.times
    }

    pub fn pending(&self) -> ChangeSet {
        self.changes.pending()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn env_rects(&self) -> &Rects {
        &self.env_rects
    }

    pub fn copy_always(&self) -> &Rects {
        &self.copy_always
    }

    pub fn old_cursor(&self) -> ShadowCursor {
        self.oc
    }

    pub fn ghost_cursor(&self) -> ShadowCursor {
        self.ghost
    }

    pub fn has_focus(&self) -> bool {
        self.got_focus
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn set_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> SurfaceMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub(crate) fn now(&self) -> i64 {
        self.clock.now_ms()
    }

    pub(crate) fn visibility_policy(&self) -> VisibilityPolicy {
        VisibilityPolicy {
            margin: self.tuning.selection_margin,
            min_extent: self.tuning.min_scroll_extent,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Change aggregation
    // ---------------------------------------------------------------------------------------------

    pub fn notify(&mut self, changes: ChangeSet) {
        self.changes.notify(changes);
    }

    pub fn has_changed(&self, question: ChangeSet) -> bool {
        self.changes.has(question)
    }

    // ---------------------------------------------------------------------------------------------
    // Focus, full screen, menus
    // ---------------------------------------------------------------------------------------------

    pub fn suspend(&mut self) {
        self.got_focus = false;
        self.notify(ChangeSet::FOCUS);
    }

    pub fn resume(&mut self) {
        self.got_focus = true;
        self.win.refresh_chrome();
        self.notify(ChangeSet::FOCUS | ChangeSet::EXTENTS);
    }

    pub fn set_full_screen(&mut self, flag: bool) {
        self.full_screen = flag;
    }

    pub fn before_menu_action(&mut self) {
        self.doc.mark_undo_block();
        self.input_mode = InputMode::Normal;
    }

    pub fn after_menu_action(&mut self) {
        self.notify(ChangeSet::DECORATIONS);
    }

    /// Language variable for the current mode. Panics on an invalid mode.
    pub fn language(&self) -> &'static str {
        language_variable(&self.doc.env_string(MODE))
    }

    // ---------------------------------------------------------------------------------------------
    // Window helpers (document coordinates)
    // ---------------------------------------------------------------------------------------------

    pub fn visible(&self) -> Rect {
        self.scaler.rect_to_document(&self.win.visible())
    }

    pub fn window_height(&self) -> Coord {
        self.visible().height()
    }

    pub fn scroll_to(&mut self, x: Coord, top: Coord) {
        self.win
            .scroll_to(self.scaler.to_device(x), self.scaler.to_device(top));
    }

    pub fn set_extents(&mut self, r: &Rect) {
        self.win.set_extents(self.scaler.to_device_outer(r));
    }

    // ---------------------------------------------------------------------------------------------
    // Window-manager handlers
    // ---------------------------------------------------------------------------------------------

    pub fn handle_resize(&mut self) {
        if self.doc.init_string(PAGE_MEDIUM) == MEDIUM_AUTOMATIC {
            self.notify(ChangeSet::AUTOMATIC_SIZE);
        }
        self.notify(ChangeSet::TREE);
    }

    /// Returns false when `which` is not a property of this surface; the
    /// caller forwards it elsewhere.
    pub fn handle_set_integer(&mut self, which: &str, value: i64) -> bool {
        if which == SHRINKING_FACTOR {
            self.set_shrink_factor(value);
            return true;
        }
        debug!(target: "surface", which, value, "set_integer_unhandled");
        false
    }

    /// Panics on a non-positive factor.
    pub fn set_shrink_factor(&mut self, factor: i64) {
        if factor <= 0 {
            error!(target: "surface", factor, "invalid_shrink_factor");
            panic!("shrink factor must be positive (got {factor})");
        }
        if self.scaler.set_factor(factor) {
            info!(target: "surface", factor, "shrink_factor_changed");
            self.doc.init_env(SFACTOR, factor.to_string());
            self.notify(ChangeSet::ENVIRONMENT | ChangeSet::AUTOMATIC_SIZE);
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Selection endpoint visibility
    // ---------------------------------------------------------------------------------------------

    /// Record the endpoint of a selection being dragged (document coordinates).
    pub fn set_selection_end(&mut self, x: Coord, y: Coord) {
        self.selection_end = Some((x, y));
    }

    pub fn selection_end(&self) -> Option<(Coord, Coord)> {
        self.selection_end
    }

    /// Scroll when the selection endpoint comes close to an edge. The cached
    /// endpoint is shifted by the resulting origin displacement. Returns
    /// whether a scroll happened.
    pub fn ensure_selection_endpoint_visible(&mut self) -> bool {
        let Some(end) = self.selection_end else {
            return false;
        };
        let before = core_render::Viewport::new(self.visible());
        let policy = self.visibility_policy();
        let Some((x, top)) = before.endpoint_target(end, self.pixel(), &policy) else {
            return false;
        };
        self.scroll_to(x, top);
        self.win.invalidate_all();
        self.metrics.record_scroll();
        let after = core_render::Viewport::new(self.visible());
        let (dx, dy) = before.origin_shift(&after);
        self.selection_end = Some((end.0 + dx, end.1 + dy));
        debug!(target: "surface.viewport", x, top, dx, dy, "selection_endpoint_scroll");
        true
    }

    // ---------------------------------------------------------------------------------------------
    // Session entry points
    // ---------------------------------------------------------------------------------------------

    fn session_identity(&self) -> SessionId {
        resolve_identity(|var| self.doc.env_string(var))
    }

    pub fn connect(&mut self) {
        let id = self.session_identity();
        let fx = self.session.connect(id, &mut self.transport);
        self.apply_session_effects(fx);
    }

    pub fn feed_input(&mut self, payload: &str) {
        let id = self.session_identity();
        let fx = self.session.feed(id, &mut self.transport, payload);
        self.apply_session_effects(fx);
    }

    /// Collect backend output; call whenever the transport may have data.
    pub fn process_session_output(&mut self) {
        let id = self.session_identity();
        let fx = self.session.poll(id, &mut self.transport);
        self.apply_session_effects(fx);
    }

    pub fn busy_connection(&mut self) -> bool {
        let id = self.session_identity();
        self.session.busy(id, &self.transport)
    }

    pub fn interrupt_connection(&mut self) -> bool {
        let id = self.session_identity();
        self.session.interrupt(id, &mut self.transport)
    }

    pub fn stop_connection(&mut self) -> bool {
        let id = self.session_identity();
        self.session.stop(id, &mut self.transport)
    }

    /// Re-resolve session identity and status from the environment.
    pub fn update_connection(&mut self) {
        let id = self.session_identity();
        self.session.refresh(id, &self.transport);
    }

    pub(crate) fn apply_session_effects(&mut self, fx: Vec<SessionEffect>) {
        for effect in fx {
            match effect {
                SessionEffect::Message(msg) => self.set_message(msg),
                SessionEffect::Insert(ins) => {
                    debug!(target: "surface.session", ?ins, "session_insert");
                    self.doc.insert(ins);
                    self.notify(ChangeSet::TREE);
                }
                SessionEffect::EnterInput => {
                    self.doc.start_input();
                    self.notify(ChangeSet::TREE);
                }
                SessionEffect::EnterOutput => {
                    self.doc.start_output();
                    self.notify(ChangeSet::TREE);
                }
            }
        }
    }

    pub fn set_message(&mut self, msg: StatusMessage) {
        match msg.level {
            core_state::MessageLevel::Info => {
                info!(target: "surface.session", text = %msg, "status_message")
            }
            _ => warn!(target: "surface.session", text = %msg, level = ?msg.level, "status_message"),
        }
        self.message = Some(msg);
        self.notify(ChangeSet::DECORATIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessDocument, HeadlessWindow};
    use core_session::ScriptedTransport;
    use core_state::ManualClock;
    use pretty_assertions::assert_eq;

    type Surface = EditSurface<HeadlessDocument, HeadlessWindow, ScriptedTransport>;

    fn surface(width: Coord, height: Coord) -> Surface {
        let tuning = SurfaceTuning {
            shrink_factor: 1,
            base_pixel: 1,
            selection_margin: 20,
            min_scroll_extent: 80,
            ..SurfaceTuning::default()
        };
        EditSurface::with_clock(
            HeadlessDocument::new(),
            HeadlessWindow::new(width, height),
            ScriptedTransport::new(),
            tuning,
            Box::new(ManualClock::new(0)),
        )
    }

    #[test]
    fn endpoint_near_edge_scrolls_and_shifts_cached_endpoint() {
        let mut s = surface(800, 600);
        s.set_selection_end(10, -300);

        assert!(s.ensure_selection_endpoint_visible());
        // only the horizontal band triggered: x recentred, top kept
        assert_eq!(s.window().scrolls, vec![(-390, 0)]);
        assert_eq!(s.visible(), Rect::new(-390, -600, 410, 0));
        assert_eq!(s.selection_end(), Some((-380, -300)));
        assert_eq!(s.window().invalidated_all, 1);

        // the shifted endpoint is still inside the margin band: keep scrolling
        assert!(s.ensure_selection_endpoint_visible());
        assert_eq!(s.window().scrolls, vec![(-390, 0), (-780, 0)]);
        assert_eq!(s.selection_end(), Some((-770, -300)));
        assert_eq!(s.metrics().scroll_into_view, 2);
    }

    #[test]
    fn endpoint_clear_of_the_edges_does_not_scroll() {
        let mut s = surface(800, 600);
        s.set_selection_end(400, -300);
        assert!(!s.ensure_selection_endpoint_visible());
        assert_eq!(s.selection_end(), Some((400, -300)));
        assert!(s.window().scrolls.is_empty());
    }

    #[test]
    fn tiny_viewport_never_autoscrolls() {
        let mut s = surface(60, 60);
        s.set_selection_end(0, 0);
        assert!(!s.ensure_selection_endpoint_visible());
        assert!(s.window().scrolls.is_empty());
    }

    #[test]
    fn no_endpoint_no_scroll() {
        let mut s = surface(800, 600);
        assert!(!s.ensure_selection_endpoint_visible());
    }
}
