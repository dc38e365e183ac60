//! geotree - nested-set place tree over the geonames flat dump
//!
//! Ingests the tab-delimited geonames dataset chunk by chunk, links
//! records through the hierarchy edge list, assigns nested-set
//! interval labels (left, right, depth) in a single pre-order pass per
//! country, and persists everything to a snapshot-file store in one
//! transaction. Containment questions ("is Paris inside France?") then
//! reduce to two integer comparisons, no traversal needed.
//!
//! Module map:
//!   - [`record`]: the place record and flat-file line decoding
//!   - [`working_set`]: bounded in-memory batch with adjacency maps
//!   - [`hierarchy`]: edge-list resolution and the PPL hierarchy builder
//!   - [`labeler`]: interval assignment over a resolved forest
//!   - [`seed`]: the chunked ingestion pipeline
//!   - [`rebuild`]: full relabel from persisted parent references
//!   - [`json_import`]: bulk restore from a JSON array
//!   - [`query`]: interval algebra predicates and slice helpers
//!   - [`store`]: the durable store trait plus memory/file backends

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod json_import;
pub mod labeler;
pub mod query;
pub mod record;
pub mod rebuild;
pub mod seed;
pub mod store;
pub mod working_set;

pub use config::GeoConfig;
pub use error::{GeoError, Result};
pub use hierarchy::{build_ppl_hierarchy, map_admin1_codes, merge_hierarchies, EdgeStats};
pub use json_import::{import_json, ImportReport};
pub use labeler::{label_forest, LabelOutcome};
pub use rebuild::{rebuild_tree, RebuildReport};
pub use record::GeoRecord;
pub use seed::{SeedOptions, SeedReport, Seeder};
pub use store::{FileStore, GeoStore, MemoryStore};
pub use working_set::WorkingSet;
