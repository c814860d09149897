//! Selection display state derived during the selection phase of an apply pass.

use core_geometry::Rects;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub made_selection: bool,
    /// The active selection spans a tabular structure (drawn in a distinct color).
    pub table_selection: bool,
    /// Display rectangles: outline of the selection geometry, already thickened.
    pub rects: Rects,
}

impl SelectionState {
    /// Collapse to a caret: no selection and no display rectangles.
    pub fn collapse(&mut self) {
        self.made_selection = false;
        self.rects = Rects::new();
    }

    pub fn is_active(&self) -> bool {
        self.made_selection
    }
}
