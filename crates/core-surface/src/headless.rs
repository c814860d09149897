//! In-memory collaborators for tests and the replay tool.
//!
//! `HeadlessDocument` has no layout engine: the caret geometry, extents,
//! node kinds and selection geometry are whatever the caller sets. It counts
//! the layout calls the pipeline makes so tests can assert on them.
//! `HeadlessWindow` keeps a visible rectangle and records invalidations,
//! scrolls and footer updates; its `RecordingDevice` logs draw operations.

use crate::collab::{Document, NodeKind, TreePath, Window};
use core_geometry::{Coord, Rect, Rects};
use core_render::paint::{Color, Device};
use core_session::Insertion;
use core_state::env::{BACKGROUND_COLOR, FONT_BASE_SIZE, MODE, PAGE_MEDIUM};
use core_state::{ShadowCursor, StatusMessage};
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCounters {
    pub preamble: usize,
    pub invalidate_env: usize,
    pub typeset: usize,
    pub go_to_here: usize,
    pub collapse_selection: usize,
    pub lazy_refresh: usize,
    pub undo_blocks: usize,
    pub start_input: usize,
    pub start_output: usize,
}

#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    env: HashMap<String, String>,
    init: HashMap<String, String>,
    extents: Rect,
    /// Laid-out caret; `go_to_here` publishes it as the current caret.
    caret: ShadowCursor,
    cursor: ShadowCursor,
    path: TreePath,
    nodes: HashMap<TreePath, (NodeKind, Rect)>,
    selection: Option<(Rects, bool)>,
    boxes: Vec<Rect>,
    page_breaks: Vec<Coord>,
    pub inserted: Vec<Insertion>,
    pub counters: LayoutCounters,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    pub fn new() -> Self {
        let mut env = HashMap::new();
        env.insert(MODE.to_string(), "text".to_string());
        let mut init = HashMap::new();
        init.insert(PAGE_MEDIUM.to_string(), "paper".to_string());
        init.insert(BACKGROUND_COLOR.to_string(), "white".to_string());
        init.insert(FONT_BASE_SIZE.to_string(), "10".to_string());
        Self {
            env,
            init,
            extents: Rect::new(0, -100_000, 50_000, 0),
            caret: ShadowCursor::at(0, 0),
            cursor: ShadowCursor::at(0, 0),
            path: TreePath::new(vec![0, 0]),
            nodes: HashMap::new(),
            selection: None,
            boxes: Vec::new(),
            page_breaks: Vec::new(),
            inserted: Vec::new(),
            counters: LayoutCounters::default(),
        }
    }

    pub fn set_env(&mut self, var: &str, value: impl Into<String>) {
        self.env.insert(var.to_string(), value.into());
    }

    pub fn set_init(&mut self, var: &str, value: impl Into<String>) {
        self.init.insert(var.to_string(), value.into());
    }

    pub fn set_extents(&mut self, r: Rect) {
        self.extents = r;
    }

    /// Move the laid-out caret. Callers notify `CURSOR` afterwards.
    pub fn set_caret(&mut self, cu: ShadowCursor) {
        self.caret = cu;
    }

    pub fn set_cursor_path(&mut self, p: TreePath) {
        self.path = p;
    }

    /// Register a node's kind and the geometry of its span.
    pub fn set_node(&mut self, p: TreePath, kind: NodeKind, r: Rect) {
        self.nodes.insert(p, (kind, r));
    }

    pub fn set_selection(&mut self, rs: Rects, table: bool) {
        self.selection = Some((rs, table));
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Content box drawn in black by `redraw`.
    pub fn add_box(&mut self, r: Rect) {
        self.boxes.push(r);
    }

    pub fn set_page_breaks(&mut self, ys: Vec<Coord>) {
        self.page_breaks = ys;
    }
}

impl Document for HeadlessDocument {
    fn env_string(&self, var: &str) -> String {
        self.env.get(var).cloned().unwrap_or_default()
    }

    fn init_string(&self, var: &str) -> String {
        self.init.get(var).cloned().unwrap_or_default()
    }

    fn init_env(&mut self, var: &str, value: String) {
        self.init.insert(var.to_string(), value);
    }

    fn typeset_preamble(&mut self) {
        self.counters.preamble += 1;
    }

    fn typeset_invalidate_env(&mut self) {
        self.counters.invalidate_env += 1;
    }

    fn typeset(&mut self) -> Rect {
        self.counters.typeset += 1;
        self.extents
    }

    fn extents(&self) -> Rect {
        self.extents
    }

    fn go_to_here(&mut self) {
        self.counters.go_to_here += 1;
        self.cursor = self.caret;
    }

    fn cursor(&self) -> ShadowCursor {
        self.cursor
    }

    fn check_cursor(&self) -> ShadowCursor {
        self.caret
    }

    fn cursor_path(&self) -> TreePath {
        self.path.clone()
    }

    fn collapse_selection(&mut self) {
        self.counters.collapse_selection += 1;
        self.selection = None;
    }

    fn selection_active_any(&self) -> bool {
        self.selection.is_some()
    }

    fn selection_active_table(&self) -> bool {
        self.selection.as_ref().is_some_and(|(_, table)| *table)
    }

    fn selection_rects(&self) -> Rects {
        self.selection
            .as_ref()
            .map(|(rs, _)| rs.clone())
            .unwrap_or_default()
    }

    fn selection_geometry(&self, from: &TreePath, _to: &TreePath) -> Rects {
        from.up()
            .and_then(|owner| self.nodes.get(&owner))
            .map(|(_, r)| Rects::single(*r))
            .unwrap_or_default()
    }

    fn node_kind(&self, p: &TreePath) -> NodeKind {
        self.nodes.get(p).map(|(k, _)| *k).unwrap_or_default()
    }

    fn start_of(&self, p: &TreePath) -> TreePath {
        p.child(0)
    }

    fn end_of(&self, p: &TreePath) -> TreePath {
        p.child(1)
    }

    fn insert(&mut self, ins: Insertion) {
        self.inserted.push(ins);
    }

    fn start_input(&mut self) {
        self.counters.start_input += 1;
    }

    fn start_output(&mut self) {
        self.counters.start_output += 1;
    }

    fn redraw(&self, dev: &mut dyn Device, region: &Rect) {
        for b in self.boxes.iter().filter(|b| b.intersects(region)) {
            dev.set_color(Color::BLACK);
            dev.fill(*b);
        }
    }

    fn page_breaks(&self) -> Vec<Coord> {
        self.page_breaks.clone()
    }

    fn lazy_refresh(&mut self) {
        self.counters.lazy_refresh += 1;
    }

    fn mark_undo_block(&mut self) {
        self.counters.undo_blocks += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    ShrinkFactor(Coord),
    Line {
        color: Color,
        x1: Coord,
        y1: Coord,
        x2: Coord,
        y2: Coord,
    },
    Fill(Color, Rect),
    Clear(Color, Rect),
    Present(Rect),
}

#[derive(Debug, Clone)]
pub struct RecordingDevice {
    pub ops: Vec<DrawOp>,
    color: Color,
    background: Color,
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            color: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

impl RecordingDevice {
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn fills(&self, color: Color) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Fill(c, r) if *c == color => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self, color: Color) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Line { color: c, .. } if *c == color))
            .count()
    }
}

impl Device for RecordingDevice {
    fn set_shrink_factor(&mut self, factor: Coord) {
        self.ops.push(DrawOp::ShrinkFactor(factor));
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn set_line_width(&mut self, _width: Coord) {}

    fn line(&mut self, x1: Coord, y1: Coord, x2: Coord, y2: Coord) {
        self.ops.push(DrawOp::Line {
            color: self.color,
            x1,
            y1,
            x2,
            y2,
        });
    }

    fn fill(&mut self, r: Rect) {
        self.ops.push(DrawOp::Fill(self.color, r));
    }

    fn clear(&mut self, r: Rect) {
        self.ops.push(DrawOp::Clear(self.background, r));
    }

    fn present(&mut self, r: Rect) {
        self.ops.push(DrawOp::Present(r));
    }
}

/// Window with a scrollable visible rectangle, device coordinates. The
/// document origin is the top-left corner, so a fresh window shows
/// `(0, -height) .. (width, 0)`.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    pub attached: bool,
    visible: Rect,
    size: (Coord, Coord),
    pub extents: Rect,
    pub invalidated: Vec<Rect>,
    pub invalidated_all: usize,
    pub scrolls: Vec<(Coord, Coord)>,
    pub repainted: bool,
    pub event_pending: bool,
    pub chrome_refreshes: usize,
    pub footer: Option<StatusMessage>,
    pub device: RecordingDevice,
}

impl HeadlessWindow {
    pub fn new(width: Coord, height: Coord) -> Self {
        Self {
            attached: true,
            visible: Rect::new(0, -height, width, 0),
            size: (width, height),
            extents: Rect::default(),
            invalidated: Vec::new(),
            invalidated_all: 0,
            scrolls: Vec::new(),
            repainted: true,
            event_pending: false,
            chrome_refreshes: 0,
            footer: None,
            device: RecordingDevice::default(),
        }
    }

    /// Change the window size, keeping the top-left corner.
    pub fn resize(&mut self, width: Coord, height: Coord) {
        self.size = (width, height);
        let (x, top) = (self.visible.x1, self.visible.y2);
        self.visible = Rect::new(x, top - height, x + width, top);
    }

    /// Drop recorded invalidations.
    pub fn clear_invalidations(&mut self) {
        self.invalidated.clear();
        self.invalidated_all = 0;
    }
}

impl Window for HeadlessWindow {
    fn attached(&self) -> bool {
        self.attached
    }

    fn visible(&self) -> Rect {
        self.visible
    }

    fn scroll_to(&mut self, x: Coord, top: Coord) {
        let (w, h) = self.size;
        self.visible = Rect::new(x, top - h, x + w, top);
        self.scrolls.push((x, top));
    }

    fn set_extents(&mut self, r: Rect) {
        self.extents = r;
    }

    fn size(&self) -> (Coord, Coord) {
        self.size
    }

    fn invalidate(&mut self, r: Rect) {
        self.invalidated.push(r);
    }

    fn invalidate_all(&mut self) {
        self.invalidated_all += 1;
    }

    fn repainted(&self) -> bool {
        self.repainted
    }

    fn event_pending(&self) -> bool {
        self.event_pending
    }

    fn device(&mut self) -> &mut dyn Device {
        &mut self.device
    }

    fn refresh_chrome(&mut self) {
        self.chrome_refreshes += 1;
    }

    fn set_footer(&mut self, msg: Option<&StatusMessage>) {
        self.footer = msg.cloned();
    }
}
