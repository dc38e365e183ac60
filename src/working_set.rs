//! In-memory working set for the current ingestion chunk.
//!
//! Holds decoded records in insertion order plus the index-based
//! adjacency maps the labeler traverses (id → slot, id → child ids).
//! NOT Send+Sync, single-writer access assumed; one chunk lives here
//! at a time and `reset()` clears it after the flush.
//!
//! Parent/child links are kept as id references in side maps rather
//! than as owning references between records, so there are no
//! ownership cycles and the persisted record stays free of traversal
//! state.

use std::collections::HashMap;

use crate::record::GeoRecord;

/// Keyed, insertion-ordered container of records for one chunk.
#[derive(Debug, Default)]
pub struct WorkingSet {
    /// Records in insertion order. Overwrites keep the original slot.
    records: Vec<GeoRecord>,

    /// Geonames id → slot in `records`. O(1) point lookup.
    by_geo_id: HashMap<u32, usize>,

    /// Parent id → child ids, in edge attachment order. Duplicates are
    /// kept (resolution does not dedup; the labeler's traversal order
    /// decides).
    children: HashMap<u32, Vec<u32>>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keyed by its geonames id. Upsert: an existing
    /// id is overwritten in place, keeping its insertion slot.
    pub fn add(&mut self, record: GeoRecord) {
        match self.by_geo_id.get(&record.id) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.by_geo_id.insert(record.id, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// Point lookup by geonames id. O(1).
    pub fn get(&self, geo_id: u32) -> Option<&GeoRecord> {
        self.by_geo_id.get(&geo_id).map(|&slot| &self.records[slot])
    }

    /// Mutable point lookup by geonames id. O(1).
    pub fn get_mut(&mut self, geo_id: u32) -> Option<&mut GeoRecord> {
        let slot = *self.by_geo_id.get(&geo_id)?;
        Some(&mut self.records[slot])
    }

    /// Linear scan lookup. Kept deliberately: callers that hold an id
    /// from outside the index path use it rarely, and the O(1) map is
    /// reserved for the hot resolution path.
    pub fn find_by_id(&self, id: u32) -> Option<&GeoRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Linear scan by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&GeoRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Set `parent_id` on the child, only if the parent is present in
    /// this set.
    pub fn set_parent(&mut self, child_id: u32, parent_id: u32) {
        if self.by_geo_id.contains_key(&parent_id) {
            if let Some(child) = self.get_mut(child_id) {
                child.parent_id = Some(parent_id);
            }
        }
    }

    /// Append a child reference to the parent's child list.
    pub fn add_child(&mut self, parent_id: u32, child_id: u32) {
        self.children.entry(parent_id).or_default().push(child_id);
    }

    /// True if the id is present. O(1).
    pub fn contains(&self, geo_id: u32) -> bool {
        self.by_geo_id.contains_key(&geo_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &GeoRecord> {
        self.records.iter()
    }

    /// Borrow the pieces the labeler needs: mutable records plus the
    /// id→slot and id→children maps.
    pub fn adjacency_mut(
        &mut self,
    ) -> (
        &mut [GeoRecord],
        &HashMap<u32, usize>,
        &HashMap<u32, Vec<u32>>,
    ) {
        (&mut self.records, &self.by_geo_id, &self.children)
    }

    /// Drain all records, leaving the set empty for the next chunk.
    pub fn drain(&mut self) -> Vec<GeoRecord> {
        self.by_geo_id.clear();
        self.children.clear();
        std::mem::take(&mut self.records)
    }

    /// Clear everything. Called once a chunk is flushed.
    pub fn reset(&mut self) {
        self.records.clear();
        self.by_geo_id.clear();
        self.children.clear();
    }
}

// -- Tests --------------------------------------------------------------------
