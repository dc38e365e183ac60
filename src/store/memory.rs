//! In-memory store: a `BTreeMap` keyed by id with a clone-snapshot
//! transaction. Backs [`super::FileStore`] and every test that does
//! not need a disk file.

use std::collections::BTreeMap;

use crate::error::{GeoError, Result};
use crate::record::GeoRecord;
use crate::store::GeoStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<u32, GeoRecord>,
    /// Pre-transaction state; Some while a transaction is open.
    snapshot: Option<BTreeMap<u32, GeoRecord>>,
    reference_checks: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            snapshot: None,
            reference_checks: true,
        }
    }

    /// True while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    pub(crate) fn records(&self) -> &BTreeMap<u32, GeoRecord> {
        &self.records
    }

    pub(crate) fn replace_records(&mut self, records: BTreeMap<u32, GeoRecord>) {
        self.records = records;
    }

    /// Reject the batch if any record's parent is neither stored nor
    /// part of the batch itself.
    fn check_references(&self, batch: &[GeoRecord]) -> Result<()> {
        if !self.reference_checks {
            return Ok(());
        }
        for record in batch {
            if let Some(parent) = record.parent_id {
                let in_store = self.records.contains_key(&parent);
                let in_batch = batch.iter().any(|r| r.id == parent);
                if !in_store && !in_batch {
                    return Err(GeoError::MissingParent {
                        child: record.id,
                        parent,
                    });
                }
            }
        }
        Ok(())
    }
}

impl GeoStore for MemoryStore {
    fn insert_batch(&mut self, records: Vec<GeoRecord>) -> Result<()> {
        self.check_references(&records)?;
        for record in records {
            self.records.insert(record.id, record);
        }
        Ok(())
    }

    fn upsert(&mut self, record: GeoRecord) -> Result<()> {
        self.check_references(std::slice::from_ref(&record))?;
        self.records.insert(record.id, record);
        Ok(())
    }

    fn get(&self, id: u32) -> Result<Option<GeoRecord>> {
        Ok(self.records.get(&id).cloned())
    }

    fn load_all(&self) -> Result<Vec<GeoRecord>> {
        Ok(self.records.values().cloned().collect())
    }

    fn max_right(&self) -> Result<Option<u32>> {
        Ok(self.records.values().filter_map(|r| r.right).max())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn next_id(&self) -> Result<u32> {
        Ok(self
            .records
            .keys()
            .next_back()
            .map(|&id| id + 1)
            .unwrap_or(1))
    }

    fn truncate(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        if self.snapshot.is_some() {
            return Err(GeoError::TransactionInProgress);
        }
        self.snapshot = Some(self.records.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.snapshot.take().ok_or(GeoError::NoTransaction)?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let snapshot = self.snapshot.take().ok_or(GeoError::NoTransaction)?;
        self.records = snapshot;
        Ok(())
    }

    fn set_reference_checks(&mut self, enabled: bool) -> Result<()> {
        self.reference_checks = enabled;
        Ok(())
    }
}

// -- Tests --------------------------------------------------------------------
