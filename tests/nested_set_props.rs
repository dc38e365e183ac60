//! Property tests for the interval labeling laws over random forests.
//!
//! A forest is generated as parent links where every parent precedes
//! its child, so it is acyclic by construction. After a rebuild the
//! labels must satisfy the nesting laws regardless of shape.

use proptest::prelude::*;

use geotree::record::{level, GeoRecord};
use geotree::store::{GeoStore, MemoryStore};
use geotree::{query, rebuild_tree};

/// Parent slot per node: `None` for a root, otherwise an index smaller
/// than the node's own, which rules out cycles.
fn forest(max_nodes: usize) -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(any::<u64>(), 1..max_nodes).prop_map(|seeds| {
        seeds
            .iter()
            .enumerate()
            .map(|(i, seed)| {
                if i == 0 || seed % 5 == 0 {
                    None
                } else {
                    Some((*seed as usize) % i)
                }
            })
            .collect()
    })
}

fn records_from(parents: &[Option<usize>]) -> Vec<GeoRecord> {
    parents
        .iter()
        .enumerate()
        .map(|(i, parent)| GeoRecord {
            id: i as u32 + 1,
            parent_id: parent.map(|p| p as u32 + 1),
            left: None,
            right: None,
            depth: 0,
            name: format!("place-{}", i + 1),
            alternate_names: vec![],
            country: None,
            a1code: None,
            level: if parent.is_none() {
                level::COUNTRY.to_string()
            } else {
                level::ADM1.to_string()
            },
            population: 0,
            lat: 0.0,
            long: 0.0,
            timezone: None,
        })
        .collect()
}

fn rebuilt(parents: &[Option<usize>]) -> Vec<GeoRecord> {
    let mut store = MemoryStore::new();
    store.set_reference_checks(false).unwrap();
    store.insert_batch(records_from(parents)).unwrap();
    store.set_reference_checks(true).unwrap();
    rebuild_tree(&mut store).unwrap();
    store.load_all().unwrap()
}

proptest! {
    #[test]
    fn every_node_is_labeled_and_bounded(parents in forest(40)) {
        let records = rebuilt(&parents);
        let n = records.len() as u32;
        for r in &records {
            let (l, rr) = (r.left.unwrap(), r.right.unwrap());
            prop_assert!(l < rr);
            prop_assert!(l >= 1 && rr <= 2 * n);
        }
    }

    #[test]
    fn endpoints_are_all_distinct(parents in forest(40)) {
        let records = rebuilt(&parents);
        let mut endpoints: Vec<u32> = records
            .iter()
            .flat_map(|r| [r.left.unwrap(), r.right.unwrap()])
            .collect();
        endpoints.sort_unstable();
        endpoints.dedup();
        prop_assert_eq!(endpoints.len(), records.len() * 2);
    }

    #[test]
    fn intervals_nest_or_are_disjoint(parents in forest(30)) {
        let records = rebuilt(&parents);
        for a in &records {
            for b in &records {
                if a.id == b.id {
                    continue;
                }
                let nested = query::is_descendant_of(a, b) || query::is_descendant_of(b, a);
                let disjoint =
                    a.right.unwrap() < b.left.unwrap() || b.right.unwrap() < a.left.unwrap();
                prop_assert!(nested ^ disjoint);
            }
        }
    }

    #[test]
    fn children_sit_one_level_below_inside_the_parent(parents in forest(40)) {
        let records = rebuilt(&parents);
        for (i, parent) in parents.iter().enumerate() {
            let Some(p) = parent else { continue };
            let child = &records[i];
            let parent = &records[*p];
            prop_assert!(query::is_child_of(child, parent));
            prop_assert_eq!(child.depth, parent.depth + 1);
        }
    }

    #[test]
    fn interval_width_counts_the_subtree(parents in forest(40)) {
        let records = rebuilt(&parents);
        for r in &records {
            let inside = records
                .iter()
                .filter(|d| query::is_descendant_of(d, r))
                .count() as u32;
            prop_assert_eq!(r.right.unwrap() - r.left.unwrap() + 1, 2 * (inside + 1));
        }
    }

    #[test]
    fn relabeling_is_idempotent(parents in forest(30)) {
        let first = rebuilt(&parents);
        let mut store = MemoryStore::new();
        store.set_reference_checks(false).unwrap();
        store.insert_batch(first.clone()).unwrap();
        store.set_reference_checks(true).unwrap();
        rebuild_tree(&mut store).unwrap();
        prop_assert_eq!(store.load_all().unwrap(), first);
    }
}
