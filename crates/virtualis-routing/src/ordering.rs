//! Feed ordering policy.
//!
//! The filter is applied first, then a stable sort on three keys:
//!
//! 1. `priority` descending
//! 2. acuity rank descending (critical = 3, urgent = 2, routine = 1)
//! 3. `timestamp` descending (newest first)
//!
//! Input order is the final, implicit tie-break.

use std::cmp::Reverse;

use virtualis_contracts::routing::{FeedEntry, FeedFilter};

/// Return a filtered, sorted copy of `entries`. The input is not touched.
pub fn order_feed(entries: &[FeedEntry], filter: &FeedFilter) -> Vec<FeedEntry> {
    let mut view: Vec<FeedEntry> = entries
        .iter()
        .filter(|e| filter.admits(e))
        .cloned()
        .collect();

    // `sort_by_key` is a stable sort.
    view.sort_by_key(|e| {
        (
            Reverse(e.triage.priority),
            Reverse(e.triage.acuity.rank()),
            Reverse(e.message.timestamp),
        )
    });
    view
}
