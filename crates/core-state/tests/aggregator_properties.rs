//! Property checks for change aggregation.

use core_state::{ChangeAggregator, ChangeSet};
use proptest::prelude::*;

fn change_strategy() -> impl Strategy<Value = ChangeSet> {
    any::<u16>().prop_map(ChangeSet::from_bits_truncate)
}

proptest! {
    // Duplicating every notification leaves the pending mask unchanged.
    #[test]
    fn duplicated_notifications_are_idempotent(seq in prop::collection::vec(change_strategy(), 0..16)) {
        let mut once = ChangeAggregator::new();
        let mut twice = ChangeAggregator::new();
        for c in &seq {
            once.notify(*c);
            twice.notify(*c);
            twice.notify(*c);
        }
        prop_assert_eq!(once.pending(), twice.pending());
    }

    // Order of notifications does not matter.
    #[test]
    fn notification_order_irrelevant(seq in prop::collection::vec(change_strategy(), 0..16)) {
        let mut fwd = ChangeAggregator::new();
        let mut rev = ChangeAggregator::new();
        for c in &seq {
            fwd.notify(*c);
        }
        for c in seq.iter().rev() {
            rev.notify(*c);
        }
        prop_assert_eq!(fwd.take(), rev.take());
        prop_assert!(fwd.is_empty() && rev.is_empty());
    }
}
