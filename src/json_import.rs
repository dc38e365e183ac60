//! Bulk JSON restore.
//!
//! Input is a JSON array of partial record objects. An object whose
//! `id` matches a stored record updates it in place (only the fields
//! present in the object). An object with no match, or no id at all,
//! is inserted with defaults and forces a full tree rebuild afterwards,
//! since a fresh record has no interval labels and may re-root part of
//! the forest.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::rebuild::{rebuild_tree, RebuildReport};
use crate::record::GeoRecord;
use crate::store::GeoStore;

/// One partial record as it appears in the restore file. Every field
/// is optional; absent fields leave an updated record untouched and
/// default on insert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonRecord {
    pub id: Option<u32>,
    pub parent_id: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
    pub depth: Option<u32>,
    pub name: Option<String>,
    pub alternate_names: Option<Vec<String>>,
    pub country: Option<String>,
    pub a1code: Option<String>,
    pub level: Option<String>,
    pub population: Option<u64>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub timezone: Option<String>,
}

impl JsonRecord {
    /// Merge the provided fields onto an existing record.
    fn apply_to(&self, record: &mut GeoRecord) {
        if let Some(parent_id) = self.parent_id {
            record.parent_id = Some(parent_id);
        }
        if let Some(left) = self.left {
            record.left = Some(left);
        }
        if let Some(right) = self.right {
            record.right = Some(right);
        }
        if let Some(depth) = self.depth {
            record.depth = depth;
        }
        if let Some(ref name) = self.name {
            record.name = name.clone();
        }
        if let Some(ref names) = self.alternate_names {
            record.alternate_names = names.clone();
        }
        if let Some(ref country) = self.country {
            record.country = Some(country.clone());
        }
        if let Some(ref a1code) = self.a1code {
            record.a1code = Some(a1code.clone());
        }
        if let Some(ref level) = self.level {
            record.level = level.clone();
        }
        if let Some(population) = self.population {
            record.population = population;
        }
        if let Some(lat) = self.lat {
            record.lat = lat;
        }
        if let Some(long) = self.long {
            record.long = long;
        }
        if let Some(ref timezone) = self.timezone {
            record.timezone = Some(timezone.clone());
        }
    }

    /// Build a fresh record with defaults for everything absent.
    fn into_record(self, id: u32) -> GeoRecord {
        GeoRecord {
            id,
            parent_id: self.parent_id,
            left: self.left,
            right: self.right,
            depth: self.depth.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            alternate_names: self.alternate_names.unwrap_or_default(),
            country: self.country,
            a1code: self.a1code,
            level: self.level.unwrap_or_default(),
            population: self.population.unwrap_or(0),
            lat: self.lat.unwrap_or(0.0),
            long: self.long.unwrap_or(0.0),
            timezone: self.timezone,
        }
    }
}

/// Counters from one restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Records updated in place.
    pub updated: usize,
    /// Records inserted with defaults.
    pub inserted: usize,
    /// The rebuild that ran because something was inserted.
    pub rebuild: Option<RebuildReport>,
}

/// Restore from a JSON file. Updates never trigger a rebuild; a single
/// insert does.
pub fn import_json<S: GeoStore>(store: &mut S, path: &Path) -> Result<ImportReport> {
    let contents = std::fs::read_to_string(path)?;
    let entries: Vec<JsonRecord> = serde_json::from_str(&contents)?;
    import_records(store, entries)
}

/// Restore from already-parsed entries (the file-free seam for tests
/// and embedding callers).
pub fn import_records<S: GeoStore>(
    store: &mut S,
    entries: Vec<JsonRecord>,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    store.begin()?;
    let result: Result<()> = (|| {
        // Restored parent references may point anywhere in the file.
        store.set_reference_checks(false)?;
        for entry in entries {
            let existing = match entry.id {
                Some(id) => store.get(id)?,
                None => None,
            };
            match existing {
                Some(mut record) => {
                    entry.apply_to(&mut record);
                    store.upsert(record)?;
                    report.updated += 1;
                }
                None => {
                    let id = match entry.id {
                        Some(id) => id,
                        None => store.next_id()?,
                    };
                    store.upsert(entry.into_record(id))?;
                    report.inserted += 1;
                }
            }
        }
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
        updated = report.updated,
        inserted = report.inserted,
        "json restore applied"
    );

    if report.inserted > 0 {
        report.rebuild = Some(rebuild_tree(store)?);
    }
    Ok(report)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::level;
    use crate::store::MemoryStore;

    fn stored_country(store: &mut MemoryStore) {
        let record = GeoRecord {
            id: 1,
            parent_id: None,
            left: Some(1),
            right: Some(2),
            depth: 0,
            name: "Country A".to_string(),
            alternate_names: vec![],
            country: Some("AA".to_string()),
            a1code: None,
            level: level::COUNTRY.to_string(),
            population: 100,
            lat: 0.0,
            long: 0.0,
            timezone: None,
        };
        store.upsert(record).unwrap();
    }

    #[test]
    fn update_in_place_touches_only_given_fields() {
        let mut store = MemoryStore::new();
        stored_country(&mut store);

        let entry = JsonRecord {
            id: Some(1),
            population: Some(999),
            ..Default::default()
        };
        let report = import_records(&mut store, vec![entry]).unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(report.inserted, 0);
        assert!(report.rebuild.is_none());

        let record = store.get(1).unwrap().unwrap();
        assert_eq!(record.population, 999);
        assert_eq!(record.name, "Country A"); // untouched
        assert_eq!((record.left, record.right), (Some(1), Some(2))); // no rebuild
    }

    #[test]
    fn insert_defaults_and_forces_rebuild() {
        let mut store = MemoryStore::new();
        stored_country(&mut store);

        let entry = JsonRecord {
            id: Some(50),
            name: Some("Country B".to_string()),
            level: Some(level::COUNTRY.to_string()),
            ..Default::default()
        };
        let report = import_records(&mut store, vec![entry]).unwrap();

        assert_eq!(report.inserted, 1);
        let rebuild = report.rebuild.unwrap();
        assert_eq!(rebuild.records, 2);
        assert_eq!(rebuild.countries, 2);

        let added = store.get(50).unwrap().unwrap();
        assert!(added.is_labeled());
        assert_eq!(added.population, 0);
        assert!(added.alternate_names.is_empty());
    }

    #[test]
    fn missing_id_gets_assigned_next() {
        let mut store = MemoryStore::new();
        stored_country(&mut store);

        let entry = JsonRecord {
            name: Some("Nameless".to_string()),
            level: Some(level::ADM1.to_string()),
            parent_id: Some(1),
            ..Default::default()
        };
        let report = import_records(&mut store, vec![entry]).unwrap();
        assert_eq!(report.inserted, 1);

        let added = store.get(2).unwrap().unwrap();
        assert_eq!(added.name, "Nameless");
        // Rebuilt as a child of the country.
        assert_eq!(added.depth, 1);
        assert!(added.is_labeled());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut store = MemoryStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restore.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(import_json(&mut store, &path).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut store = MemoryStore::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restore.json");
        std::fs::write(&path, r#"[{"id": 1, "wat": true}]"#).unwrap();

        assert!(import_json(&mut store, &path).is_err());
    }
}
