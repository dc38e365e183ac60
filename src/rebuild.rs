//! Full tree rebuild from persisted parent references.
//!
//! Used after the store's `parent_id` values were edited directly, or
//! after a bulk JSON restore introduced new records. The whole set is
//! loaded, parent/child links are derived into a transient children
//! map (built once, discarded after labeling; the persisted record
//! never carries traversal state), everything is relabeled with the
//! counter restarted at 1, and every record is written back whether or
//! not its labels changed.
//!
//! Precondition (unchecked): the persisted `parent_id` chain is
//! acyclic. A cycle recurses without bound; callers own that
//! guarantee.

use std::collections::HashMap;

use tracing::info;

use crate::error::Result;
use crate::labeler::label_forest;
use crate::store::GeoStore;

/// Counters from one rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Records loaded and written back.
    pub records: usize,
    /// Country trees labeled.
    pub countries: usize,
    /// Records with no resolvable parent and a non-country level.
    pub orphans: usize,
}

/// Rebuild the whole forest in one transaction.
pub fn rebuild_tree<S: GeoStore>(store: &mut S) -> Result<RebuildReport> {
    let mut records = store.load_all()?;
    info!(records = records.len(), "rebuilding tree");

    // Transient adjacency: id → slot, and parent id → child ids in
    // id order (load_all is id-ordered). Only edges whose parent is
    // actually loaded attach.
    let index: HashMap<u32, usize> = records
        .iter()
        .enumerate()
        .map(|(slot, r)| (r.id, slot))
        .collect();
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for record in &records {
        if let Some(parent) = record.parent_id {
            if index.contains_key(&parent) {
                children.entry(parent).or_default().push(record.id);
            }
        }
    }

    // A full rebuild restarts the interval space at 1.
    let outcome = label_forest(&mut records, &index, &children, 1);

    let report = RebuildReport {
        records: records.len(),
        countries: outcome.countries,
        orphans: outcome.orphans,
    };

    store.begin()?;
    let result: Result<()> = (|| {
        // Children may precede parents in id order.
        store.set_reference_checks(false)?;
        store.insert_batch(records)?;
        store.set_reference_checks(true)?;
        Ok(())
    })();
    match result {
        Ok(()) => store.commit()?,
        Err(e) => {
            store.rollback()?;
            return Err(e);
        }
    }

    info!(
        countries = report.countries,
        orphans = report.orphans,
        "rebuild completed"
    );
    Ok(report)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{level, GeoRecord};
    use crate::store::{GeoStore, MemoryStore};

    fn make_record(id: u32, parent: Option<u32>, lvl: &str) -> GeoRecord {
        GeoRecord {
            id,
            parent_id: parent,
            left: None,
            right: None,
            depth: 0,
            name: format!("place-{}", id),
            alternate_names: vec![],
            country: None,
            a1code: None,
            level: lvl.to_string(),
            population: 0,
            lat: 0.0,
            long: 0.0,
            timezone: None,
        }
    }

    fn seed_unlabeled(store: &mut MemoryStore) {
        store.set_reference_checks(false).unwrap();
        store
            .insert_batch(vec![
                make_record(1, None, level::COUNTRY),
                make_record(2, Some(1), level::ADM1),
                make_record(3, Some(2), level::PPL),
            ])
            .unwrap();
        store.set_reference_checks(true).unwrap();
    }

    #[test]
    fn rebuild_labels_from_parent_ids() {
        let mut store = MemoryStore::new();
        seed_unlabeled(&mut store);

        let report = rebuild_tree(&mut store).unwrap();
        assert_eq!(
            report,
            RebuildReport {
                records: 3,
                countries: 1,
                orphans: 0
            }
        );

        let root = store.get(1).unwrap().unwrap();
        assert_eq!((root.left, root.right, root.depth), (Some(1), Some(6), 0));
        let leaf = store.get(3).unwrap().unwrap();
        assert_eq!((leaf.left, leaf.right, leaf.depth), (Some(3), Some(4), 2));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut store = MemoryStore::new();
        seed_unlabeled(&mut store);

        rebuild_tree(&mut store).unwrap();
        let first = store.load_all().unwrap();
        rebuild_tree(&mut store).unwrap();
        let second = store.load_all().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn rebuild_restarts_counter_at_one() {
        let mut store = MemoryStore::new();
        // Pre-labeled far above 1, as after several appends.
        let mut rec = make_record(1, None, level::COUNTRY);
        rec.left = Some(500);
        rec.right = Some(501);
        store.insert_batch(vec![rec]).unwrap();

        rebuild_tree(&mut store).unwrap();
        let root = store.get(1).unwrap().unwrap();
        assert_eq!((root.left, root.right), (Some(1), Some(2)));
    }

    #[test]
    fn rebuild_reports_orphans_and_keeps_them_stored() {
        let mut store = MemoryStore::new();
        store.set_reference_checks(false).unwrap();
        store
            .insert_batch(vec![
                make_record(1, None, level::COUNTRY),
                make_record(2, Some(999), level::ADM1), // dangling parent
            ])
            .unwrap();
        store.set_reference_checks(true).unwrap();

        let report = rebuild_tree(&mut store).unwrap();
        assert_eq!(report.orphans, 1);
        // Unlike ingestion, rebuild writes back everything it loaded.
        assert_eq!(store.count().unwrap(), 2);
        assert!(!store.get(2).unwrap().unwrap().is_labeled());
    }

    #[test]
    fn rebuild_after_parent_edit_moves_subtree() {
        let mut store = MemoryStore::new();
        store.set_reference_checks(false).unwrap();
        store
            .insert_batch(vec![
                make_record(1, None, level::COUNTRY),
                make_record(2, Some(1), level::ADM1),
                make_record(3, Some(1), level::ADM1),
                make_record(4, Some(2), level::PPL),
            ])
            .unwrap();
        store.set_reference_checks(true).unwrap();
        rebuild_tree(&mut store).unwrap();

        // Re-parent the city from State 2 to State 3, as a direct edit
        // would, then rebuild.
        let mut city = store.get(4).unwrap().unwrap();
        city.parent_id = Some(3);
        store.upsert(city).unwrap();
        rebuild_tree(&mut store).unwrap();

        let all = store.load_all().unwrap();
        let state3 = all.iter().find(|r| r.id == 3).unwrap();
        let city = all.iter().find(|r| r.id == 4).unwrap();
        assert!(crate::query::is_child_of(city, state3));
        let state2 = all.iter().find(|r| r.id == 2).unwrap();
        assert!(!crate::query::is_descendant_of(city, state2));
    }
}
