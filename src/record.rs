//! Geo record type and the geonames line decoder.
//!
//! One record is one place (country, admin division, settlement).
//! The decoder understands the geonames dump format: tab-delimited,
//! 19 positional fields per line. Only a known subset of offsets is
//! consumed; the rest of the line is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};

/// Number of tab-delimited fields in a well-formed geonames line.
pub const FIELD_COUNT: usize = 19;

/// Display length limit for `name`.
pub const NAME_MAX_CHARS: usize = 40;

/// Geonames feature codes used as tree levels.
pub mod level {
    /// Country, the only code allowed to root a tree.
    pub const COUNTRY: &str = "PCLI";
    /// Capital city.
    pub const CAPITAL: &str = "PPLC";
    /// Generic populated place.
    pub const PPL: &str = "PPL";
    /// First-order admin division.
    pub const ADM1: &str = "ADM1";
    /// Second-order admin division.
    pub const ADM2: &str = "ADM2";
    /// Third-order admin division.
    pub const ADM3: &str = "ADM3";
    /// Seat of a first-order admin division.
    pub const PPLA: &str = "PPLA";
    /// Seat of a second-order admin division.
    pub const PPLA2: &str = "PPLA2";
}

/// One geographic place, as persisted in the store.
///
/// `left`/`right`/`depth` are the nested-set labels: an ancestor's
/// `[left, right]` interval strictly contains every descendant's, and
/// siblings get disjoint intervals in attachment order. They are `None`
/// until the labeler has visited the record.
///
/// Transient tree links (child lists) deliberately do NOT live here;
/// they belong to the working set's adjacency maps, so the persisted
/// record never carries traversal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// Geonames id, externally supplied, unique across the dataset.
    pub id: u32,

    /// Parent geonames id, set by hierarchy resolution (or by a bulk
    /// restore). None for roots and orphans.
    #[serde(default)]
    pub parent_id: Option<u32>,

    /// Nested-set left boundary. None until labeled.
    #[serde(default)]
    pub left: Option<u32>,

    /// Nested-set right boundary. None until labeled.
    #[serde(default)]
    pub right: Option<u32>,

    /// Tree depth: 0 for roots, parent depth + 1 otherwise.
    #[serde(default)]
    pub depth: u32,

    /// Place name, truncated to [`NAME_MAX_CHARS`] characters.
    pub name: String,

    /// Alternate names decoded from the CSV-style subfield.
    #[serde(default)]
    pub alternate_names: Vec<String>,

    /// ISO-3166 2-letter country code.
    #[serde(default)]
    pub country: Option<String>,

    /// Compound admin1 key, `CC.A1` (e.g. "US.CA").
    #[serde(default)]
    pub a1code: Option<String>,

    /// Geonames feature code (see [`level`]). Empty when unknown.
    #[serde(default)]
    pub level: String,

    /// Population, 0 when absent or unparsable.
    #[serde(default)]
    pub population: u64,

    /// Latitude in decimal degrees.
    #[serde(default)]
    pub lat: f64,

    /// Longitude in decimal degrees.
    #[serde(default)]
    pub long: f64,

    /// IANA timezone name.
    #[serde(default)]
    pub timezone: Option<String>,
}

impl GeoRecord {
    /// True once the labeler has assigned both interval boundaries.
    pub fn is_labeled(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

/// Peek at the feature code (field 7) of a raw line without decoding.
///
/// Used for the import allow-list check, which must happen before any
/// record is created. Returns None when the line is too short to carry
/// the field.
pub fn line_level(line: &str) -> Option<&str> {
    line.split('\t').nth(7)
}

/// Decode one geonames line into a typed record.
///
/// Field offsets consumed: 0=id, 2=name, 3=alternate names,
/// 4=latitude, 5=longitude, 7=feature code, 8=country code,
/// 10=admin1 code, 14=population, 17=timezone.
///
/// Lines with a wrong field count are rejected (the caller reports and
/// skips them; they never abort a batch). Numeric subfields parse
/// leniently: an unparsable population or coordinate becomes the
/// default, matching the source data's loose typing.
pub fn decode_line(line: &str) -> Result<GeoRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(GeoError::InvalidLineFormat {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    let id: u32 = fields[0]
        .trim()
        .parse()
        .map_err(|_| GeoError::InvalidLineFormat {
            expected: FIELD_COUNT,
            found: fields.len(),
        })?;

    let a1code = match (non_empty(fields[8]), non_empty(fields[10])) {
        (Some(country), Some(a1)) => Some(format!("{}.{}", country, a1)),
        _ => None,
    };

    Ok(GeoRecord {
        id,
        parent_id: None,
        left: None,
        right: None,
        depth: 0,
        name: fields[2].chars().take(NAME_MAX_CHARS).collect(),
        alternate_names: parse_name_list(fields[3]),
        country: non_empty(fields[8]).map(str::to_string),
        a1code,
        level: fields[7].to_string(),
        population: fields[14].trim().parse().unwrap_or(0),
        lat: fields[4].trim().parse().unwrap_or(0.0),
        long: fields[5].trim().parse().unwrap_or(0.0),
        timezone: non_empty(fields[17]).map(str::to_string),
    })
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parse the alternate-names subfield: comma-separated, with optional
/// double-quoted entries (`""` escapes a quote inside one).
///
/// This never fails: malformed quoting degrades to whatever entries
/// were recovered, and an empty subfield yields an empty list.
pub fn parse_name_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let mut names = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                names.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    names.push(current);

    names.retain(|n| !n.is_empty());
    names
}

// -- Tests --------------------------------------------------------------------
