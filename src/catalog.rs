//! Edition catalog for batch runs
//!
//! The catalog is a JSON object whose entries each name an edition and its
//! vendor archive suffix, keyed by an arbitrary label:
//!
//! ```json
//! {
//!   "city": {"id": "GeoLite2-City", "format": "tar.gz"},
//!   "city-csv": {"id": "GeoLite2-City-CSV", "format": "zip"}
//! }
//! ```
//!
//! Entries are held in a `BTreeMap` keyed by label, so a batch run processes
//! editions in a stable order regardless of how the file is written.

use crate::error::{Error, Result};
use crate::types::{ArchiveFormat, Edition, EditionId};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One catalog entry: the edition and the archive suffix it is published as
#[derive(Clone, Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    format: String,
}

/// Ordered set of editions a batch run should mirror
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, (EditionId, ArchiveFormat)>,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| Error::Config {
            message: format!("failed to read catalog {}: {e}", path.display()),
            key: Some("catalog".into()),
        })?;
        Self::parse(&raw)
    }

    /// Parse a catalog from JSON text.
    ///
    /// An unknown format value rejects the whole catalog; a typo'd suffix is
    /// a configuration mistake, not an edition to skip.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw_entries: BTreeMap<String, CatalogEntry> = serde_json::from_str(raw)?;

        let mut entries = BTreeMap::new();
        for (label, entry) in raw_entries {
            let format = entry.format.parse::<ArchiveFormat>()?;
            entries.insert(label, (EditionId::new(entry.id), format));
        }
        Ok(Self { entries })
    }

    /// Editions in label order.
    pub fn editions(&self) -> impl Iterator<Item = Edition> + '_ {
        self.entries
            .values()
            .map(|(id, format)| Edition::new(id.clone(), *format))
    }

    /// Number of catalogued editions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
