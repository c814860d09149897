//! Pending-change aggregation.
//!
//! Mutators only record *what kind* of change happened; the apply pipeline
//! later consumes the accumulated mask exactly once. Recording is a plain
//! bitwise OR, so repeating a notification between two passes is a no-op.
//!
//! Invariants:
//! * After `take`, the aggregator is empty.
//! * `notify` has no side effect besides the OR (idempotent under repetition).

use bitflags::bitflags;

bitflags! {
    /// Categories of pending change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChangeSet: u16 {
        const TREE           = 0b0000_0001; // document content changed
        const ENVIRONMENT    = 0b0000_0010; // global style / environment changed
        const SELECTION      = 0b0000_0100;
        const DECORATIONS    = 0b0000_1000; // menus, icons, footer
        const EXTENTS        = 0b0001_0000;
        const CURSOR         = 0b0010_0000;
        const FOCUS          = 0b0100_0000;
        const AUTOMATIC_SIZE = 0b1000_0000;
    }
}

#[derive(Debug, Default)]
pub struct ChangeAggregator {
    pending: ChangeSet,
}

impl ChangeAggregator {
    pub fn new() -> Self {
        Self {
            pending: ChangeSet::empty(),
        }
    }

    /// OR `changes` into the pending mask.
    pub fn notify(&mut self, changes: ChangeSet) {
        tracing::trace!(target: "state.changes", ?changes, "notify_change");
        self.pending |= changes;
    }

    /// True when any category of `question` is pending.
    pub fn has(&self, question: ChangeSet) -> bool {
        self.pending.intersects(question)
    }

    pub fn pending(&self) -> ChangeSet {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Consume the pending mask, leaving the aggregator empty.
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(&mut self.pending)
    }
}
