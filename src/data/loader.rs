//! JSON-backed candidate catalog.
//!
//! The catalog file maps region names to flag entries:
//!
//! ```json
//! { "Europe": [ { "code": "fr", "name": "France" } ] }
//! ```
//!
//! All display-name cleanup happens here, once, at load time: underscores in
//! source names stand in for spaces and codes are lowercased.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use super::CandidateSource;
use crate::models::Candidate;

#[derive(Debug, Deserialize)]
struct RawEntry {
    code: String,
    name: String,
}

/// An in-memory catalog of flag candidates grouped by region.
#[derive(Debug)]
pub struct CandidateCatalog {
    regions: BTreeMap<String, Vec<Candidate>>,
}

impl CandidateCatalog {
    /// Load a catalog from a JSON file.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let raw: BTreeMap<String, Vec<RawEntry>> = serde_json::from_str(json)?;

        let mut regions = BTreeMap::new();
        let mut seen_codes = Vec::new();
        for (region, entries) in raw {
            let mut candidates = Vec::with_capacity(entries.len());
            for entry in entries {
                let code = entry.code.trim().to_lowercase();
                let name = entry.name.trim().replace('_', " ");
                if code.is_empty() || name.is_empty() {
                    return Err(LoadError::BlankEntry(region));
                }
                if seen_codes.contains(&code) {
                    return Err(LoadError::DuplicateCode(code));
                }
                seen_codes.push(code.clone());
                candidates.push(Candidate::new(code, name, region.clone()));
            }
            regions.insert(region, candidates);
        }

        if seen_codes.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }

        Ok(Self { regions })
    }

    /// Region names in the catalog, sorted.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Total number of candidates across all regions.
    pub fn candidate_count(&self) -> usize {
        self.regions.values().map(Vec::len).sum()
    }
}

impl CandidateSource for CandidateCatalog {
    fn list_candidates(&self, region: &str) -> Result<Vec<Candidate>, LoadError> {
        self.regions
            .get(region)
            .cloned()
            .ok_or_else(|| LoadError::UnknownRegion(region.to_string()))
    }
}

/// Error loading or querying a catalog.
#[derive(Debug)]
pub enum LoadError {
    /// Reading the catalog file failed.
    Io(io::Error),
    /// The catalog was not valid JSON of the expected shape.
    Parse(serde_json::Error),
    /// The catalog contains no candidates at all.
    EmptyCatalog,
    /// The same country code appeared twice.
    DuplicateCode(String),
    /// An entry with an empty code or name, keyed by region.
    BlankEntry(String),
    /// A region that is not in the catalog was requested.
    UnknownRegion(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read catalog: {}", e),
            LoadError::Parse(e) => write!(f, "failed to parse catalog: {}", e),
            LoadError::EmptyCatalog => write!(f, "catalog contains no candidates"),
            LoadError::DuplicateCode(code) => {
                write!(f, "duplicate country code {:?} in catalog", code)
            }
            LoadError::BlankEntry(region) => {
                write!(f, "blank code or name in region {:?}", region)
            }
            LoadError::UnknownRegion(region) => write!(f, "unknown region {:?}", region),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Parse(err)
    }
}
