//! Hierarchy edge resolution and hierarchy-file tooling.
//!
//! The geonames hierarchy file is tab-delimited, two columns per line
//! (`parent_id`, `child_id`), no header. Resolution is best-effort and
//! chunk-local: a pair whose endpoints are not both in the current
//! working set is dropped without error, expected whenever the
//! hierarchy spans chunk boundaries or references a level outside the
//! import allow-list.
//!
//! Also implements the PPL hierarchy supplement: geonames ships no
//! admin→settlement edges for plain PPL records, so they are derived
//! from admin1CodesASCII.txt and merged into a per-country hierarchy
//! file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{GeoError, Result};
use crate::working_set::WorkingSet;

/// Counters from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeStats {
    /// Pairs where both endpoints resolved and links were attached.
    pub resolved: usize,
    /// Pairs dropped: endpoint missing from the working set, short
    /// line, or a non-numeric id.
    pub dropped: usize,
}

/// Resolve hierarchy pairs from `reader` against the working set.
///
/// For each resolvable pair the parent gains the child in its child
/// list (duplicates kept) and the child's `parent_id` is set. Nothing
/// is deferred: unresolved pairs are counted and forgotten.
pub fn resolve_edges<R: BufRead>(reader: R, set: &mut WorkingSet) -> Result<EdgeStats> {
    let mut stats = EdgeStats::default();

    for line in reader.lines() {
        let line = line?;
        match parse_edge(&line) {
            Some((parent_id, child_id))
                if set.contains(parent_id) && set.contains(child_id) =>
            {
                set.add_child(parent_id, child_id);
                set.set_parent(child_id, parent_id);
                stats.resolved += 1;
            }
            _ => stats.dropped += 1,
        }
    }

    Ok(stats)
}

/// Parse one edge line. None for short lines or non-numeric ids.
fn parse_edge(line: &str) -> Option<(u32, u32)> {
    let mut cols = line.split('\t');
    let parent = cols.next()?.trim().parse().ok()?;
    let child = cols.next()?.trim().parse().ok()?;
    Some((parent, child))
}

/// Pick the hierarchy file for a run: `hierarchy-CC.txt` when a
/// country is given and the file exists, otherwise `hierarchy.txt`.
pub fn hierarchy_path(storage_root: &Path, country: Option<&str>) -> PathBuf {
    if let Some(country) = country {
        let candidate = storage_root.join(format!("hierarchy-{}.txt", country));
        if candidate.exists() {
            return candidate;
        }
    }
    storage_root.join("hierarchy.txt")
}

/// Resolve the hierarchy file for this run against the working set.
///
/// A missing hierarchy file is not fatal: the chunk is labeled with
/// whatever links exist (typically producing orphans), matching the
/// per-line error taxonomy. Only the record source file is required.
pub fn resolve_from_file(
    storage_root: &Path,
    country: Option<&str>,
    set: &mut WorkingSet,
) -> Result<EdgeStats> {
    let path = hierarchy_path(storage_root, country);
    if !path.exists() {
        warn!(path = %path.display(), "hierarchy file not found, skipping resolution");
        return Ok(EdgeStats::default());
    }

    let reader = BufReader::new(File::open(&path)?);
    let stats = resolve_edges(reader, set)?;
    info!(
        path = %path.display(),
        resolved = stats.resolved,
        dropped = stats.dropped,
        "hierarchy resolution finished"
    );
    Ok(stats)
}

// -- PPL hierarchy supplement -------------------------------------------------

/// Read admin1CodesASCII.txt into a `CC.A1` → admin1 geonames id map.
///
/// The file is tab-delimited: compound code, name, ascii name, geo id.
/// Lines with fewer than 4 columns are skipped.
pub fn map_admin1_codes(path: &Path) -> Result<HashMap<String, u32>> {
    if !path.exists() {
        return Err(GeoError::InputFileMissing(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut map = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let cols: Vec<&str> = line.trim().split('\t').collect();
        if cols.len() >= 4 {
            if let Ok(geo_id) = cols[3].trim().parse() {
                map.insert(cols[0].to_string(), geo_id);
            }
        }
    }
    Ok(map)
}

/// Derive `(admin1 geoid, ppl geoid)` edges for every PPL* row of a
/// country file and write them to `hierarchy-ppl-CC.txt`.
///
/// Returns the number of edges written. Rows whose `CC.A1` key has no
/// admin1 mapping are skipped.
pub fn build_ppl_hierarchy(
    storage_root: &Path,
    country: &str,
    admin1: &HashMap<String, u32>,
) -> Result<usize> {
    let country_file = storage_root.join(format!("{}.txt", country));
    if !country_file.exists() {
        return Err(GeoError::InputFileMissing(country_file));
    }

    let out_path = storage_root.join(format!("hierarchy-ppl-{}.txt", country));
    let mut out = File::create(&out_path)?;
    let reader = BufReader::new(File::open(&country_file)?);
    let mut count = 0;

    for line in reader.lines() {
        let line = line?;
        let cols: Vec<&str> = line.trim_end().split('\t').collect();
        let code = cols.get(7).copied().unwrap_or("");
        if !code.contains("PPL") {
            continue;
        }
        let (Some(geo_id), Some(cc), Some(a1)) = (cols.first(), cols.get(8), cols.get(10))
        else {
            continue;
        };
        let key = format!("{}.{}", cc, a1);
        if let Some(parent_id) = admin1.get(&key) {
            writeln!(out, "{}\t{}", parent_id, geo_id)?;
            count += 1;
        }
    }

    info!(path = %out_path.display(), edges = count, "wrote ppl hierarchy");
    Ok(count)
}

/// Merge the global hierarchy with the derived PPL hierarchy into
/// `hierarchy-CC.txt`, dropping blank and duplicate lines while
/// preserving first-seen order.
pub fn merge_hierarchies(storage_root: &Path, country: &str) -> Result<PathBuf> {
    let sources = [
        storage_root.join("hierarchy.txt"),
        storage_root.join(format!("hierarchy-ppl-{}.txt", country)),
    ];

    let mut seen = std::collections::HashSet::new();
    let mut lines = Vec::new();
    for source in &sources {
        if !source.exists() {
            warn!(path = %source.display(), "hierarchy source missing, skipping");
            continue;
        }
        let reader = BufReader::new(File::open(source)?);
        for line in reader.lines() {
            let line = line?.trim().to_string();
            if !line.is_empty() && seen.insert(line.clone()) {
                lines.push(line);
            }
        }
    }

    let out_path = storage_root.join(format!("hierarchy-{}.txt", country));
    let mut out = File::create(&out_path)?;
    for line in &lines {
        writeln!(out, "{}", line)?;
    }
    info!(path = %out_path.display(), lines = lines.len(), "merged hierarchy");
    Ok(out_path)
}

// -- Tests --------------------------------------------------------------------
