use core_config::SurfaceTuning;
use core_geometry::{Rect, Rects, Scaler};
use core_render::Damage;
use core_session::ScriptedTransport;
use core_state::env::{PAGE_HEIGHT, PAGE_MEDIUM, PAGE_WIDTH};
use core_state::{ChangeSet, InputMode, ManualClock, ShadowCursor};
use core_surface::{
    ApplyOutcome, Document, EditSurface, HeadlessDocument, HeadlessWindow, NodeKind, Phase,
    TreePath,
};
use pretty_assertions::assert_eq;

type Surface = EditSurface<HeadlessDocument, HeadlessWindow, ScriptedTransport>;

fn tuning() -> SurfaceTuning {
    SurfaceTuning {
        idle_debounce_ms: 166,
        selection_margin: 20,
        min_scroll_extent: 80,
        automatic_size_margin: 20,
        shrink_factor: 2,
        base_pixel: 1,
        extra_font_factor: 3,
    }
}

fn surface(clock: &ManualClock) -> Surface {
    EditSurface::with_clock(
        HeadlessDocument::new(),
        HeadlessWindow::new(400, 300),
        ScriptedTransport::new(),
        tuning(),
        Box::new(clock.clone()),
    )
}

#[test]
fn caret_move_damages_old_and_new_outlines() {
    let clock = ManualClock::new(1000);
    let mut s = surface(&clock);
    s.document_mut()
        .set_caret(ShadowCursor::new(100, -100, -10, 20, 0.0, true));
    s.notify(ChangeSet::CURSOR);

    let report = s.apply_changes();

    assert_eq!(report.outcome, ApplyOutcome::Applied);
    assert_eq!(report.phases, vec![Phase::Cursor]);
    assert!(!report.scrolled);
    // old caret at the origin: (-6,-6,4,6) -> (-3,-3,2,3)
    // new caret: (94,-116,104,-74) -> (46,-58,52,-36)
    let expected = vec![Rect::new(46, -58, 52, -36), Rect::new(-3, -3, 2, 3)];
    assert_eq!(report.damage.rects(), expected.as_slice());
    assert_eq!(s.window().invalidated, expected);
    assert_eq!(
        s.copy_always(),
        &Rects::from(vec![Rect::new(94, -116, 104, -74), Rect::new(-6, -6, 4, 6)])
    );
    assert_eq!(s.old_cursor(), s.document().cursor());
    assert!(s.pending().is_empty());
    assert_eq!(s.times().last_update(), s.times().last_change() - 1);
    assert_eq!(s.times().last_change(), 1000);
}

#[test]
fn caret_step_damages_both_outlines_not_just_the_new_one() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    let a = ShadowCursor::new(10, -60, 0, 20, 0.0, true);
    let b = ShadowCursor::new(10, -30, 0, 20, 0.0, true);
    s.document_mut().set_caret(a);
    s.notify(ChangeSet::CURSOR);
    s.apply_changes();

    s.document_mut().set_caret(b);
    s.notify(ChangeSet::CURSOR);
    let report = s.apply_changes();

    assert!(!report.scrolled);
    let scaler = Scaler::new(2, 1);
    let old = scaler.to_device_outer(&a.damage_outline(2));
    let new = scaler.to_device_outer(&b.damage_outline(2));
    for piece in [old, new] {
        let covered = report.damage.rects().iter().any(|d| d.contains(&piece));
        assert!(covered, "caret outline {piece:?} not damaged");
    }
    let hull = Rect::new(
        old.x1.min(new.x1),
        old.y1.min(new.y1),
        old.x2.max(new.x2),
        old.y2.max(new.y2),
    );
    assert!(report.damage.rects().iter().all(|d| hull.contains(d)));
}

#[test]
fn caret_outside_view_recenters_and_redraws_everything() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.document_mut()
        .set_caret(ShadowCursor::new(100, -5000, 0, 20, 0.0, true));
    s.notify(ChangeSet::CURSOR);

    let report = s.apply_changes();

    assert!(report.scrolled);
    assert_eq!(report.damage, Damage::All);
    // visible (0,-600,800,0) in document units; center on the caret anchor
    assert_eq!(s.window().scrolls, vec![(-150, -2350)]);
    assert_eq!(s.window().invalidated_all, 1);
    assert!(s.window().invalidated.is_empty());
    assert_eq!(s.visible(), Rect::new(-300, -5300, 500, -4700));
    assert_eq!(s.metrics().scroll_into_view, 1);
    assert_eq!(s.metrics().full_invalidations, 1);
}

#[test]
fn tree_change_runs_layout_phases_in_order() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.document_mut()
        .set_caret(ShadowCursor::new(100, -100, -10, 20, 0.0, true));
    s.notify(ChangeSet::TREE);

    let report = s.apply_changes();

    assert!(!report.scrolled);
    assert_eq!(
        report.phases,
        vec![
            Phase::PreInvalidateSelection,
            Phase::Tree,
            Phase::Extents,
            Phase::Cursor
        ]
    );
    let counters = s.document().counters;
    assert_eq!(counters.typeset, 1);
    assert_eq!(counters.invalidate_env, 1);
    assert_eq!(counters.collapse_selection, 1);
    assert_eq!(counters.go_to_here, 1);
    assert_eq!(counters.preamble, 0);
    assert_eq!(s.window().extents, Rect::new(0, -50000, 25000, 0));
    // extents thickened by 2px, rounded outward
    assert!(report.damage.rects().contains(&Rect::new(-2, -50002, 25002, 2)));
}

#[test]
fn retypeset_outside_normal_mode_keeps_document_selection() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.set_input_mode(InputMode::Search);
    s.document_mut()
        .set_selection(Rects::single(Rect::new(0, -40, 100, -20)), false);
    s.notify(ChangeSet::TREE);
    s.apply_changes();
    assert_eq!(s.document().counters.collapse_selection, 0);
    assert!(s.document().selection_active_any());
}

#[test]
fn selection_phase_outlines_and_damages_selection() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    let raw = Rects::single(Rect::new(0, -100, 200, -50));
    s.document_mut().set_selection(raw.clone(), true);
    s.notify(ChangeSet::SELECTION);

    let report = s.apply_changes();

    assert_eq!(
        report.phases,
        vec![Phase::PreInvalidateSelection, Phase::Selection]
    );
    let sel = s.selection();
    assert!(sel.made_selection);
    assert!(sel.table_selection);
    assert_eq!(sel.rects, raw.outline((0, 4), (2, 6)));
    assert!(!report.damage.rects().is_empty());

    // dropping the selection damages the old outline before recomputing
    let old = s.selection().rects.clone();
    s.document_mut().clear_selection();
    s.notify(ChangeSet::SELECTION);
    let report = s.apply_changes();
    assert!(!s.selection().made_selection);
    let scaler = Scaler::new(2, 1);
    for r in &old {
        let dev = scaler.to_device_outer(&r.thicken(2, 2));
        let covered = report.damage.rects().iter().any(|d| d.contains(&dev));
        assert!(covered, "old selection piece {dev:?} not damaged");
    }
}

#[test]
fn automatic_medium_sizes_page_from_window() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.document_mut().set_init(PAGE_MEDIUM, "automatic");
    s.handle_resize();
    assert!(s.has_changed(ChangeSet::AUTOMATIC_SIZE));

    let report = s.apply_changes();

    // (400 - 20 * 1) * 2 and 300 * 2
    assert_eq!(s.document().init_string(PAGE_WIDTH), "760unit");
    assert_eq!(s.document().init_string(PAGE_HEIGHT), "600unit");
    assert!(report.changes.contains(ChangeSet::ENVIRONMENT));
    assert_eq!(
        report.phases,
        vec![
            Phase::AutomaticSize,
            Phase::PreInvalidateSelection,
            Phase::Environment,
            Phase::Tree,
            Phase::Extents,
            Phase::Cursor,
            Phase::EnvironmentWide
        ]
    );
    assert_eq!(report.damage, Damage::All);
    assert_eq!(s.document().counters.preamble, 1);
}

#[test]
fn automatic_size_is_a_noop_for_paper() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.notify(ChangeSet::AUTOMATIC_SIZE);
    let report = s.apply_changes();
    assert_eq!(report.phases, vec![Phase::AutomaticSize]);
    assert_eq!(report.damage, Damage::None);
    assert_eq!(s.document().init_string(PAGE_WIDTH), "");
}

#[test]
fn shrink_factor_change_rescales_and_redraws() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    assert!(s.handle_set_integer(core_surface::SHRINKING_FACTOR, 4));
    assert_eq!(s.pixel(), 4);
    assert_eq!(s.document().init_string("sfactor"), "4");
    assert!(s.has_changed(ChangeSet::ENVIRONMENT | ChangeSet::AUTOMATIC_SIZE));
    let report = s.apply_changes();
    assert_eq!(report.damage, Damage::All);

    // unchanged factor raises nothing
    s.set_shrink_factor(4);
    assert!(s.pending().is_empty());
    assert!(!s.handle_set_integer("magnification", 3));
}

#[test]
#[should_panic(expected = "shrink factor must be positive")]
fn zero_shrink_factor_is_fatal() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.set_shrink_factor(0);
}

#[test]
#[should_panic(expected = "detached window")]
fn apply_on_detached_window_is_fatal() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.window_mut().attached = false;
    s.notify(ChangeSet::TREE);
    s.apply_changes();
}

#[test]
fn empty_apply_on_detached_window_is_harmless() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.window_mut().attached = false;
    assert_eq!(s.apply_changes().outcome, ApplyOutcome::Idle);
}

#[test]
fn environment_highlights_follow_the_caret_path() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.document_mut()
        .set_cursor_path(TreePath::new(vec![0, 2, 1, 0]));
    s.document_mut().set_node(
        TreePath::new(vec![0, 2]),
        NodeKind::Other,
        Rect::new(0, -60, 120, -20),
    );
    s.notify(ChangeSet::CURSOR);
    s.apply_changes();
    let highlighted = s.env_rects().clone();
    assert!(!highlighted.is_empty());
    let expected = Rects::single(Rect::new(0, -60, 120, -20)).outline((0, 4), (2, 6));
    assert_eq!(highlighted, expected);

    // an unchanged set is not damaged again: only the two caret outlines remain
    s.notify(ChangeSet::CURSOR);
    let report = s.apply_changes();
    assert_eq!(report.damage.rects(), &[Rect::new(-3, -3, 2, 3)]);

    // leaving the node damages the old highlights
    s.document_mut().set_cursor_path(TreePath::new(vec![0, 5]));
    s.notify(ChangeSet::CURSOR);
    let report = s.apply_changes();
    assert!(s.env_rects().is_empty());
    assert!(report.damage.rects().len() > 1);
}

#[test]
fn changes_raised_during_a_pass_do_not_leak_into_the_next() {
    let clock = ManualClock::new(0);
    let mut s = surface(&clock);
    s.notify(ChangeSet::TREE | ChangeSet::SELECTION);
    s.apply_changes();
    assert!(s.pending().is_empty());
    let second = s.apply_changes();
    assert_ne!(second.outcome, ApplyOutcome::Applied);
}
