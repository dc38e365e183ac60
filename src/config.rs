//! Runtime configuration.
//!
//! Defaults mirror the geonames import conventions; a JSON config file
//! can override any subset of fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::record::level;

/// Default chunk size for batch processing.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    /// Base URL for geonames dump files. Downloading is handled by an
    /// external collaborator; the URL lives here so one config file
    /// describes the whole pipeline.
    pub geonames_url: String,

    /// Directory holding the downloaded source and hierarchy files.
    pub storage_root: PathBuf,

    /// Snapshot file name for the durable store, relative to
    /// `storage_root` unless absolute.
    pub store_file: PathBuf,

    /// Records per chunk: one batch is resolved, labeled and written
    /// together, then the working set resets.
    pub chunk_size: usize,

    /// Feature codes eligible for import. Lines with any other code
    /// are skipped before decoding.
    pub import_levels: Vec<String>,

    /// File name of the admin1 codes table (for the PPL hierarchy).
    pub admin1_codes_file: String,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            geonames_url: "https://download.geonames.org/export/dump".to_string(),
            storage_root: PathBuf::from("geo"),
            store_file: PathBuf::from("geo.db"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            import_levels: [
                level::COUNTRY,
                level::CAPITAL,
                level::ADM1,
                level::ADM2,
                level::ADM3,
                level::PPLA,
                level::PPLA2,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            admin1_codes_file: "admin1CodesASCII.txt".to_string(),
        }
    }
}

impl GeoConfig {
    /// Load from a JSON file; absent fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// True when `code` is in the import allow-list.
    pub fn imports_level(&self, code: &str) -> bool {
        self.import_levels.iter().any(|l| l == code)
    }

    /// Absolute path of the store snapshot file.
    pub fn store_path(&self) -> PathBuf {
        if self.store_file.is_absolute() {
            self.store_file.clone()
        } else {
            self.storage_root.join(&self.store_file)
        }
    }

    /// Path of the admin1 codes table.
    pub fn admin1_codes_path(&self) -> PathBuf {
        self.storage_root.join(&self.admin1_codes_file)
    }
}

// -- Tests --------------------------------------------------------------------
