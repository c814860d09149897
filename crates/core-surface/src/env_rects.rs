//! Environment highlight rectangles.
//!
//! Starting at the parent of the caret's leaf, walk toward the root and
//! outline every node whose local environment differs from its context.
//! Layout containers (`NodeKind::is_structural`) are skipped. A script node
//! is outlined by the span of its body; any other node by the span between
//! the positions just before and just after it. The root itself is never
//! outlined.
//!
//! Outlines use the same shape as selections: the geometry thickened by
//! `(px, 3px)` minus the geometry thickened by `(0, 2px)`.

use crate::collab::{Document, NodeKind};
use core_geometry::{Coord, Rects};

pub(crate) fn outline(rs: &Rects, pixel: Coord) -> Rects {
    rs.outline((0, 2 * pixel), (pixel, 3 * pixel))
}

pub fn compute_env_rects<D: Document + ?Sized>(doc: &D, pixel: Coord) -> Rects {
    let mut out = Rects::new();
    let Some(mut p) = doc.cursor_path().up() else {
        return out;
    };
    while let Some(node) = p.up() {
        if node.is_root() {
            break;
        }
        let kind = doc.node_kind(&node);
        if !kind.is_structural() {
            let (from, to) = match kind {
                NodeKind::Script => {
                    let body = node.child(0);
                    (doc.start_of(&body), doc.end_of(&body))
                }
                _ => (node.child(0), node.child(1)),
            };
            out.extend(outline(&doc.selection_geometry(&from, &to), pixel));
        }
        p = node;
    }
    out
}

/// Members of `a` absent from `b` plus members of `b` absent from `a`.
pub fn symmetric_difference(a: &Rects, b: &Rects) -> Rects {
    let only_a = a.iter().filter(|r| !b.as_slice().contains(r));
    let only_b = b.iter().filter(|r| !a.as_slice().contains(r));
    only_a.chain(only_b).copied().collect()
}
