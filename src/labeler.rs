//! Nested-set interval labeler.
//!
//! Pre-order depth-first traversal over the resolved parent/child
//! links, assigning each record a `(left, right, depth)` triple such
//! that an ancestor's interval strictly contains every descendant's
//! and siblings get disjoint intervals in attachment order.
//!
//! The counter is threaded explicitly through the recursion (passed
//! in, returned out) with no shared mutable state, so the pass is
//! referentially transparent and testable without a store.
//!
//! Cycles in the child maps are an unchecked precondition violation:
//! the traversal recurses without a visited set and a cyclic input
//! will exhaust the stack. Callers (ingestion resolution, rebuild map
//! construction) only ever produce acyclic links.

use std::collections::HashMap;

use tracing::debug;

use crate::record::{level, GeoRecord};

/// Summary of one labeling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOutcome {
    /// Trees labeled (root records of level PCLI).
    pub countries: usize,
    /// Unresolvable non-country records: counted, skipped, unlabeled.
    pub orphans: usize,
    /// First unused counter value after the pass.
    pub next: u32,
}

/// Label every tree in the forest.
///
/// A record roots a tree when its parent is unresolvable (no
/// `parent_id`, or one naming an id absent from `index`) and its level
/// is PCLI. An unresolvable record of any other level is an orphan.
/// Roots are visited in slice order, children in attachment order.
///
/// `start` is the first counter value to hand out; pass
/// `max(persisted right) + 1` to extend an existing interval space, or
/// 1 for a fresh store.
pub fn label_forest(
    records: &mut [GeoRecord],
    index: &HashMap<u32, usize>,
    children: &HashMap<u32, Vec<u32>>,
    start: u32,
) -> LabelOutcome {
    let mut counter = start;
    let mut countries = 0;
    let mut orphans = 0;

    for slot in 0..records.len() {
        let resolvable = match records[slot].parent_id {
            None => false,
            Some(parent) => index.contains_key(&parent),
        };
        if resolvable {
            continue;
        }

        if records[slot].level == level::COUNTRY {
            debug!(
                id = records[slot].id,
                name = %records[slot].name,
                "labeling country tree"
            );
            countries += 1;
            counter = assign_intervals(records, index, children, slot, counter, 0);
        } else {
            orphans += 1;
        }
    }

    LabelOutcome {
        countries,
        orphans,
        next: counter,
    }
}

/// Assign intervals to one subtree rooted at `slot`.
///
/// Returns the next unused counter value. Children are visited in the
/// order they were attached; child ids absent from `index` are skipped
/// (they belong to another chunk or were filtered out).
pub fn assign_intervals(
    records: &mut [GeoRecord],
    index: &HashMap<u32, usize>,
    children: &HashMap<u32, Vec<u32>>,
    slot: usize,
    mut counter: u32,
    depth: u32,
) -> u32 {
    records[slot].left = Some(counter);
    records[slot].depth = depth;
    counter += 1;

    let id = records[slot].id;
    if let Some(child_ids) = children.get(&id) {
        for child_id in child_ids {
            if let Some(&child_slot) = index.get(child_id) {
                counter =
                    assign_intervals(records, index, children, child_slot, counter, depth + 1);
            }
        }
    }

    records[slot].right = Some(counter);
    counter + 1
}

// -- Tests --------------------------------------------------------------------
