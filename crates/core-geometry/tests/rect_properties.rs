//! Property checks for rectangle algebra and coordinate scaling.

use core_geometry::{Coord, Rect, Rects, Scaler};
use proptest::prelude::*;

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (-40i64..40, -40i64..40, 0i64..30, 0i64..30)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, x + w, y + h))
}

fn rects_strategy() -> impl Strategy<Value = Rects> {
    prop::collection::vec(rect_strategy(), 0..6).prop_map(Rects::from)
}

proptest! {
    // subtract covers exactly A \ B at every sampled point
    #[test]
    fn subtract_matches_pointwise(a in rects_strategy(), b in rects_strategy(), x in -45i64..75, y in -45i64..75) {
        let d = a.subtract(&b);
        prop_assert_eq!(d.covers(x, y), a.covers(x, y) && !b.covers(x, y));
    }

    // simplify never changes coverage
    #[test]
    fn simplify_preserves_coverage(a in rects_strategy(), x in -45i64..75, y in -45i64..75) {
        let s = a.simplify();
        prop_assert_eq!(s.covers(x, y), a.covers(x, y));
        prop_assert_eq!(s.area(), a.area());
        prop_assert_eq!(s.simplify(), s.clone());
    }

    // union coverage is independent of operand order
    #[test]
    fn union_order_irrelevant(a in rects_strategy(), b in rects_strategy()) {
        prop_assert_eq!(a.union(&b).simplify().area(), b.union(&a).simplify().area());
        let ab = a.union(&b).simplify();
        let ba = b.union(&a).simplify();
        prop_assert!(ab.subtract(&ba).is_empty());
        prop_assert!(ba.subtract(&ab).is_empty());
    }

    // outline never paints inside the inner thickening
    #[test]
    fn outline_excludes_inner(shape in rects_strategy(), x in -45i64..75, y in -45i64..75) {
        let band = shape.outline((0, 2), (1, 3));
        if shape.thicken(0, 2).covers(x, y) {
            prop_assert!(!band.covers(x, y));
        }
    }

    // device -> document -> device stays within rounding tolerance
    #[test]
    fn scaler_round_trip_within_tolerance(f in 1i64..9, p in -10_000i64..10_000) {
        let s = Scaler::new(f, 256);
        let doc: Coord = s.to_document(p);
        prop_assert!((s.lower(doc) - p).abs() <= f - 1);
        prop_assert!((s.upper(doc) - p).abs() <= f - 1);
        if f == 1 {
            prop_assert_eq!(s.lower(doc), p);
            prop_assert_eq!(s.upper(doc), p);
        }
    }

    // outward rounding always covers the document rectangle for non-negative coordinates
    #[test]
    fn outward_rounding_covers(f in 1i64..9, r in rect_strategy()) {
        let s = Scaler::new(f, 256);
        let shifted = r.translate(100, 100);
        let dev = s.to_device_outer(&shifted);
        prop_assert!(s.rect_to_document(&dev).contains(&shifted));
    }
}
