//! Durable store boundary.
//!
//! The pipeline talks to storage only through the [`GeoStore`] trait:
//! bulk inserts, full loads, the interval high-water mark, and a
//! single-transaction protocol. Two implementations ship in-crate:
//! [`MemoryStore`] for tests and ephemeral runs, [`FileStore`] for a
//! snapshot-file on disk. Committed intervals are immutable until a
//! full rebuild; there is exactly one writer at a time by design.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::record::GeoRecord;

/// Storage contract for labeled geo records.
///
/// Transactions: at most one open at a time; `commit`/`rollback`
/// without a preceding `begin` is an error. Everything a seed run
/// writes happens inside one transaction, so a failure anywhere rolls
/// back the whole run.
///
/// Reference checks: when enabled, writes reject records whose
/// `parent_id` resolves to neither the store nor the same batch. Bulk
/// ingestion disables them for the duration of a run (children may be
/// written before parents within a chunk) and re-enables them after.
pub trait GeoStore {
    /// Bulk-insert (upsert by id) a batch of records.
    fn insert_batch(&mut self, records: Vec<GeoRecord>) -> Result<()>;

    /// Insert or replace a single record.
    fn upsert(&mut self, record: GeoRecord) -> Result<()>;

    /// Point lookup by id.
    fn get(&self, id: u32) -> Result<Option<GeoRecord>>;

    /// Load every record, ordered by id.
    fn load_all(&self) -> Result<Vec<GeoRecord>>;

    /// Highest assigned `right` boundary, None when nothing is labeled.
    /// The labeler resumes its counter from this + 1.
    fn max_right(&self) -> Result<Option<u32>>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;

    /// Smallest id above every stored id (1 for an empty store).
    fn next_id(&self) -> Result<u32>;

    /// Delete all records.
    fn truncate(&mut self) -> Result<()>;

    /// Open a transaction.
    fn begin(&mut self) -> Result<()>;

    /// Commit the open transaction, making its writes durable.
    fn commit(&mut self) -> Result<()>;

    /// Discard every write since `begin`.
    fn rollback(&mut self) -> Result<()>;

    /// Toggle parent reference checking for subsequent writes.
    fn set_reference_checks(&mut self, enabled: bool) -> Result<()>;
}
