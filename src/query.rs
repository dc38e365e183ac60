//! Containment queries over nested-set labels.
//!
//! Every predicate here needs only `(left, right, depth)`: no
//! traversal, no recursive lookups. That is the entire reason the
//! labeling pass exists. Records that were never labeled satisfy no
//! predicate.
//!
//! The set helpers operate on a loaded slice (typically
//! `GeoStore::load_all`), standing in for the SQL scopes of the
//! original model; the `(left, right, depth)` filters are exactly the
//! indexed queries the durable schema was designed for.

use crate::record::{level, GeoRecord};

// -- Predicates ---------------------------------------------------------------

/// True when `record` lies strictly inside `ancestor`'s interval.
pub fn is_descendant_of(record: &GeoRecord, ancestor: &GeoRecord) -> bool {
    match (record.left, record.right, ancestor.left, ancestor.right) {
        (Some(l), Some(r), Some(al), Some(ar)) => l > al && r < ar,
        _ => false,
    }
}

/// True when `record`'s interval strictly contains `descendant`'s.
pub fn is_ancestor_of(record: &GeoRecord, descendant: &GeoRecord) -> bool {
    is_descendant_of(descendant, record)
}

/// True when `record` is an immediate child of `parent`.
pub fn is_child_of(record: &GeoRecord, parent: &GeoRecord) -> bool {
    is_descendant_of(record, parent) && record.depth == parent.depth + 1
}

/// True when `record` is the immediate parent of `child`.
pub fn is_parent_of(record: &GeoRecord, child: &GeoRecord) -> bool {
    is_child_of(child, record)
}

// -- Set helpers --------------------------------------------------------------

/// All strict descendants of `of`, in interval (pre-order) order.
pub fn descendants_of<'a>(records: &'a [GeoRecord], of: &GeoRecord) -> Vec<&'a GeoRecord> {
    let mut found: Vec<&GeoRecord> = records
        .iter()
        .filter(|r| is_descendant_of(r, of))
        .collect();
    found.sort_by_key(|r| r.left);
    found
}

/// All strict ancestors of `of`, ordered country-first (by depth).
pub fn ancestors_of<'a>(records: &'a [GeoRecord], of: &GeoRecord) -> Vec<&'a GeoRecord> {
    let mut found: Vec<&GeoRecord> =
        records.iter().filter(|r| is_ancestor_of(r, of)).collect();
    found.sort_by_key(|r| r.depth);
    found
}

/// Immediate children of `of`, ordered by name.
pub fn children_of<'a>(records: &'a [GeoRecord], of: &GeoRecord) -> Vec<&'a GeoRecord> {
    let mut found: Vec<&GeoRecord> =
        records.iter().filter(|r| is_child_of(r, of)).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// The immediate parent of `of`. At most one by construction.
pub fn parent_of<'a>(records: &'a [GeoRecord], of: &GeoRecord) -> Option<&'a GeoRecord> {
    records.iter().find(|r| is_parent_of(r, of))
}

/// All country records, ordered by name.
pub fn countries(records: &[GeoRecord]) -> Vec<&GeoRecord> {
    by_level(records, level::COUNTRY)
}

/// The country record for a 2-letter code.
pub fn country<'a>(records: &'a [GeoRecord], code: &str) -> Option<&'a GeoRecord> {
    records
        .iter()
        .find(|r| r.level == level::COUNTRY && r.country.as_deref() == Some(code))
}

/// All records of one level, ordered by name.
pub fn by_level<'a>(records: &'a [GeoRecord], lvl: &str) -> Vec<&'a GeoRecord> {
    let mut found: Vec<&GeoRecord> = records.iter().filter(|r| r.level == lvl).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// All capital cities, ordered by name.
pub fn capitals(records: &[GeoRecord]) -> Vec<&GeoRecord> {
    by_level(records, level::CAPITAL)
}

/// Records matching a set of ids, ordered by name.
pub fn by_ids<'a>(records: &'a [GeoRecord], ids: &[u32]) -> Vec<&'a GeoRecord> {
    let mut found: Vec<&GeoRecord> =
        records.iter().filter(|r| ids.contains(&r.id)).collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

/// Case-insensitive substring search over `name` and alternate names,
/// optionally restricted to descendants of `under`, ordered by name.
pub fn search_names<'a>(
    records: &'a [GeoRecord],
    needle: &str,
    under: Option<&GeoRecord>,
) -> Vec<&'a GeoRecord> {
    let needle = needle.to_lowercase();
    let mut found: Vec<&GeoRecord> = records
        .iter()
        .filter(|r| match under {
            Some(parent) => is_descendant_of(r, parent),
            None => true,
        })
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r.alternate_names
                    .iter()
                    .any(|n| n.to_lowercase().contains(&needle))
        })
        .collect();
    found.sort_by(|a, b| a.name.cmp(&b.name));
    found
}

// -- Tests --------------------------------------------------------------------
