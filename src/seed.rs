//! Chunked ingestion pipeline: read file → resolve hierarchy → label
//! → bulk write → reset, one store transaction around the whole run.
//!
//! Memory stays bounded for multi-million-row dumps because only one
//! chunk of records is ever held: the hierarchy is re-read and
//! resolved per chunk against that chunk alone (best-effort: edges
//! spanning chunk boundaries become orphans, not errors).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::GeoConfig;
use crate::error::{GeoError, Result};
use crate::hierarchy;
use crate::labeler::label_forest;
use crate::record::{self, FIELD_COUNT};
use crate::store::GeoStore;
use crate::working_set::WorkingSet;

/// Options for one seed run.
#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    /// 2-letter country code; None imports the allCountries dump.
    pub country: Option<String>,
    /// Extend the existing store instead of truncating it first.
    pub append: bool,
    /// Chunk size override; falls back to the configured value.
    pub chunk_size: Option<usize>,
    /// Delete the consumed source files after a successful commit.
    pub cleanup: bool,
}

/// Counters from one seed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Lines accepted into a working set (allow-listed, well-formed).
    pub records_read: usize,
    /// Lines rejected for a wrong field count or unparsable id.
    pub malformed_lines: usize,
    /// Chunks flushed.
    pub batches: usize,
    /// Country trees labeled across all chunks.
    pub countries: usize,
    /// Orphans counted and skipped across all chunks.
    pub orphans: usize,
    /// Labeled records written to the store.
    pub written: usize,
}

/// The end-to-end seeder. Single writer by design: it owns the store
/// mutably for the whole run.
pub struct Seeder<'a, S: GeoStore> {
    store: &'a mut S,
    config: &'a GeoConfig,
}

impl<'a, S: GeoStore> Seeder<'a, S> {
    pub fn new(store: &'a mut S, config: &'a GeoConfig) -> Self {
        Self { store, config }
    }

    /// Run the full ingestion. A missing source file is fatal before
    /// the transaction opens; any later failure rolls the whole run
    /// back and aborts.
    pub fn run(&mut self, opts: &SeedOptions) -> Result<SeedReport> {
        let started = Instant::now();
        let country = opts.country.as_deref().map(str::to_uppercase);
        let source_name = country.clone().unwrap_or_else(|| "allCountries".to_string());
        let source_path = self
            .config
            .storage_root
            .join(format!("{}.txt", source_name));

        if !source_path.exists() {
            return Err(GeoError::InputFileMissing(source_path));
        }

        info!(source = %source_path.display(), "starting seed");
        self.store.begin()?;

        match self.run_inner(&source_path, country.as_deref(), opts) {
            Ok(report) => {
                self.store.commit()?;
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    records = report.written,
                    countries = report.countries,
                    orphans = report.orphans,
                    batches = report.batches,
                    "seed completed"
                );
                if opts.cleanup {
                    self.cleanup_files(&source_name, country.as_deref());
                }
                Ok(report)
            }
            Err(e) => {
                self.store.rollback()?;
                Err(e)
            }
        }
    }

    fn run_inner(
        &mut self,
        source_path: &std::path::Path,
        country: Option<&str>,
        opts: &SeedOptions,
    ) -> Result<SeedReport> {
        if !opts.append {
            info!("truncating store");
            self.store.truncate()?;
        }

        // Children may be written before their parents within a chunk.
        self.store.set_reference_checks(false)?;

        let chunk_size = opts.chunk_size.unwrap_or(self.config.chunk_size).max(1);
        let reader = BufReader::new(File::open(source_path)?);
        let mut set = WorkingSet::new();
        let mut report = SeedReport::default();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.split('\t').count() != FIELD_COUNT {
                warn!(
                    id = line.split('\t').next().unwrap_or("unknown"),
                    "invalid line format, skipping"
                );
                report.malformed_lines += 1;
                continue;
            }

            let code = record::line_level(&line).unwrap_or("");
            if !self.config.imports_level(code) {
                continue;
            }

            match record::decode_line(&line) {
                Ok(rec) => {
                    set.add(rec);
                    report.records_read += 1;
                }
                Err(e) => {
                    warn!(error = %e, "invalid line format, skipping");
                    report.malformed_lines += 1;
                }
            }

            if set.len() >= chunk_size {
                self.flush_chunk(&mut set, country, &mut report)?;
            }
        }

        if !set.is_empty() {
            self.flush_chunk(&mut set, country, &mut report)?;
        }

        self.store.set_reference_checks(true)?;
        Ok(report)
    }

    /// Resolve, label and persist one chunk, then reset the set.
    ///
    /// Only labeled records are written; orphans leave with the reset.
    /// The counter extends the store's interval high-water mark so
    /// successive chunks share one global interval space.
    fn flush_chunk(
        &mut self,
        set: &mut WorkingSet,
        country: Option<&str>,
        report: &mut SeedReport,
    ) -> Result<()> {
        hierarchy::resolve_from_file(&self.config.storage_root, country, set)?;

        let start = self.store.max_right()?.map_or(1, |r| r + 1);
        let (records, index, children) = set.adjacency_mut();
        let outcome = label_forest(records, index, children, start);
        report.countries += outcome.countries;
        report.orphans += outcome.orphans;

        let labeled: Vec<_> = set
            .drain()
            .into_iter()
            .filter(|r| r.is_labeled())
            .collect();
        report.written += labeled.len();
        self.store.insert_batch(labeled)?;

        report.batches += 1;
        info!(
            batch = report.batches,
            countries = outcome.countries,
            orphans = outcome.orphans,
            "processed batch"
        );
        Ok(())
    }

    /// Best-effort deletion of the consumed input files. Failures are
    /// logged, never fatal; the import has already committed.
    fn cleanup_files(&self, source_name: &str, country: Option<&str>) {
        let root = &self.config.storage_root;
        let mut targets: Vec<PathBuf> = vec![
            root.join(format!("{}.txt", source_name)),
            root.join(format!("{}.zip", source_name)),
            root.join("hierarchy.txt"),
            root.join(format!("hierarchy-{}.txt", source_name)),
        ];

        // Importing the full dump obsoletes every per-country hierarchy.
        if country.is_none() {
            if let Ok(entries) = std::fs::read_dir(root) {
                for entry in entries.flatten() {
                    let name = entry.file_name();
                    let name = name.to_string_lossy();
                    if name.starts_with("hierarchy-") && name.ends_with(".txt") {
                        targets.push(entry.path());
                    }
                }
            }
        }

        for path in targets {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "deleted"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to delete"),
            }
        }
    }
}

// -- Tests --------------------------------------------------------------------
