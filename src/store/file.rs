//! Snapshot-file store: [`MemoryStore`] semantics persisted to a
//! single bincode file.
//!
//! The snapshot is rewritten atomically (temp file + rename in the
//! same directory) on commit, and write-through outside transactions.
//! Reopening loads the last committed snapshot, so a crash mid-run
//! leaves the previous state intact, the on-disk analogue of the
//! transaction rollback.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{GeoError, Result};
use crate::record::GeoRecord;
use crate::store::{GeoStore, MemoryStore};

#[derive(Debug)]
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open a store at `path`, loading the snapshot when one exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut inner = MemoryStore::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let records: BTreeMap<u32, GeoRecord> = bincode::deserialize_from(reader)
                .map_err(|e| GeoError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
            info!(path = %path.display(), records = records.len(), "loaded store snapshot");
            inner.replace_records(records);
        }

        Ok(Self { inner, path })
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current state to disk atomically.
    fn persist(&self) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            bincode::serialize_into(writer, self.inner.records())?;
        }
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn persist_unless_open(&self) -> Result<()> {
        if self.inner.in_transaction() {
            return Ok(());
        }
        self.persist()
    }
}

impl GeoStore for FileStore {
    fn insert_batch(&mut self, records: Vec<GeoRecord>) -> Result<()> {
        self.inner.insert_batch(records)?;
        self.persist_unless_open()
    }

    fn upsert(&mut self, record: GeoRecord) -> Result<()> {
        self.inner.upsert(record)?;
        self.persist_unless_open()
    }

    fn get(&self, id: u32) -> Result<Option<GeoRecord>> {
        self.inner.get(id)
    }

    fn load_all(&self) -> Result<Vec<GeoRecord>> {
        self.inner.load_all()
    }

    fn max_right(&self) -> Result<Option<u32>> {
        self.inner.max_right()
    }

    fn count(&self) -> Result<usize> {
        self.inner.count()
    }

    fn next_id(&self) -> Result<u32> {
        self.inner.next_id()
    }

    fn truncate(&mut self) -> Result<()> {
        self.inner.truncate()?;
        self.persist_unless_open()
    }

    fn begin(&mut self) -> Result<()> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<()> {
        self.inner.commit()?;
        self.persist()
    }

    fn rollback(&mut self) -> Result<()> {
        self.inner.rollback()
    }

    fn set_reference_checks(&mut self, enabled: bool) -> Result<()> {
        self.inner.set_reference_checks(enabled)
    }
}

// -- Tests --------------------------------------------------------------------
