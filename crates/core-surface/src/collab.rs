//! Collaborator seams: the document/layout engine and the window layer.
//!
//! Neither is implemented here beyond the headless versions in `headless`.
//! Coordinates: `Document` speaks document coordinates; `Window` speaks
//! device coordinates (document / shrink factor). The surface converts.

use core_geometry::{Coord, Rect, Rects};
use core_render::Device;
use core_session::Insertion;
use core_state::{ShadowCursor, StatusMessage};

/// Path from the document root: child indices, the last entry of a caret
/// path being the offset inside a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TreePath(pub Vec<usize>);

impl TreePath {
    pub fn new(ix: impl Into<Vec<usize>>) -> Self {
        Self(ix.into())
    }

    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Parent path; `None` for the root.
    pub fn up(&self) -> Option<TreePath> {
        let (_, parent) = self.0.split_last()?;
        Some(TreePath(parent.to_vec()))
    }

    pub fn child(&self, i: usize) -> TreePath {
        let mut v = self.0.clone();
        v.push(i);
        TreePath(v)
    }
}

/// Structural kind of a document node, as far as the surface cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    Atomic,
    Document,
    Concat,
    Table,
    SubTable,
    Row,
    Cell,
    TableFormat,
    /// Sub/superscript: highlighted by its body only.
    Script,
    #[default]
    Other,
}

impl NodeKind {
    /// Layout containers that never get an environment highlight.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            NodeKind::Atomic
                | NodeKind::Document
                | NodeKind::Concat
                | NodeKind::Table
                | NodeKind::SubTable
                | NodeKind::Row
                | NodeKind::Cell
                | NodeKind::TableFormat
        )
    }
}

/// Document model plus typesetter, as consumed by the surface.
pub trait Document {
    /// Environment value at the caret.
    fn env_string(&self, var: &str) -> String;
    /// Document-level (initial) environment value.
    fn init_string(&self, var: &str) -> String;
    fn init_int(&self, var: &str) -> i64 {
        self.init_string(var).trim().parse().unwrap_or(0)
    }
    fn init_env(&mut self, var: &str, value: String);

    fn typeset_preamble(&mut self);
    fn typeset_invalidate_env(&mut self);
    /// Re-run layout; returns the new document extents.
    fn typeset(&mut self) -> Rect;
    fn extents(&self) -> Rect;

    /// Recompute the caret geometry for the current caret path.
    fn go_to_here(&mut self);
    fn cursor(&self) -> ShadowCursor;
    /// Caret snapshot checked against the current layout.
    fn check_cursor(&self) -> ShadowCursor;
    fn cursor_path(&self) -> TreePath;

    /// Reset the selection to the caret position.
    fn collapse_selection(&mut self);
    fn selection_active_any(&self) -> bool;
    fn selection_active_table(&self) -> bool;
    /// Raw geometry of the active selection.
    fn selection_rects(&self) -> Rects;
    /// Geometry of the range between two caret positions.
    fn selection_geometry(&self, from: &TreePath, to: &TreePath) -> Rects;

    fn node_kind(&self, p: &TreePath) -> NodeKind;
    /// First caret position inside the node at `p`.
    fn start_of(&self, p: &TreePath) -> TreePath;
    /// Last caret position inside the node at `p`.
    fn end_of(&self, p: &TreePath) -> TreePath;

    fn insert(&mut self, ins: Insertion);
    /// Place a fresh input prompt for the session.
    fn start_input(&mut self);
    /// Mark the session as producing output.
    fn start_output(&mut self);

    /// Draw document content intersecting `region`.
    fn redraw(&self, dev: &mut dyn Device, region: &Rect);
    /// Vertical positions of page separators.
    fn page_breaks(&self) -> Vec<Coord> {
        Vec::new()
    }

    /// Deferred, idle-time refresh (syntax/semantic passes).
    fn lazy_refresh(&mut self) {}
    fn mark_undo_block(&mut self) {}
}

/// Window-manager side of the surface.
pub trait Window {
    fn attached(&self) -> bool;
    /// Visible region, device coordinates.
    fn visible(&self) -> Rect;
    /// Scroll so that `(x, top)` is the top-left corner.
    fn scroll_to(&mut self, x: Coord, top: Coord);
    fn set_extents(&mut self, r: Rect);
    /// Window size `(width, height)`, device coordinates.
    fn size(&self) -> (Coord, Coord);
    fn invalidate(&mut self, r: Rect);
    fn invalidate_all(&mut self);
    /// No repaint is outstanding.
    fn repainted(&self) -> bool;
    /// An input event is queued.
    fn event_pending(&self) -> bool;
    fn device(&mut self) -> &mut dyn Device;
    /// Rebuild menus and icon bars.
    fn refresh_chrome(&mut self) {}
    fn set_footer(&mut self, _msg: Option<&StatusMessage>) {}
}
