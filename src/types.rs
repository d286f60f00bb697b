//! Core types for geomirror

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::Error;

/// Unique identifier for a vendor edition (e.g. `GeoLite2-City`)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct EditionId(pub String);

impl EditionId {
    /// Create a new EditionId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EditionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EditionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Archive format published by the vendor feed
///
/// The format determines both the download suffix and which member files are
/// selected at publish time: the tar.gz family carries a single `.mmdb`
/// database, the zip family carries `.csv` members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Gzip-compressed tarball (`tar.gz`), publishes `.mmdb` members
    TarGz,
    /// ZIP archive (`zip`), publishes `.csv` members
    Zip,
}

impl ArchiveFormat {
    /// The vendor suffix used in feed query parameters and staged filenames
    pub fn suffix(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "tar.gz",
            ArchiveFormat::Zip => "zip",
        }
    }

    /// The file extension of members selected at publish time
    pub fn member_extension(&self) -> &'static str {
        match self {
            ArchiveFormat::TarGz => "mmdb",
            ArchiveFormat::Zip => "csv",
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tar.gz" => Ok(ArchiveFormat::TarGz),
            "zip" => Ok(ArchiveFormat::Zip),
            other => Err(Error::InvalidFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Plain data record for one edition within one update attempt
///
/// Constructed per batch entry or API request and discarded afterwards; only
/// the version strings round-trip through the version store and the vendor
/// feed. Services operate *on* this record, it owns no clients itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edition {
    /// Edition identifier
    pub id: EditionId,
    /// Archive format published by the vendor for this edition
    pub format: ArchiveFormat,
    /// Last version durably mirrored, if any (loaded from the version store)
    pub current_version: Option<String>,
    /// Version currently published by the vendor (resolved per run)
    pub latest_version: Option<String>,
}

impl Edition {
    /// Create a new edition record with no versions resolved yet
    pub fn new(id: impl Into<EditionId>, format: ArchiveFormat) -> Self {
        Self {
            id: id.into(),
            format,
            current_version: None,
            latest_version: None,
        }
    }
}

/// Major stage of an edition update, in execution order
///
/// Used for structured logging and to report where cancellation was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Resolve the vendor's latest version from feed metadata
    Resolve,
    /// Stream the archive payload to staging storage
    Fetch,
    /// Unpack the staged archive into the working directory
    Extract,
    /// Copy selected members into the artifact repository
    Publish,
    /// Write the version marker after a successful publish
    Mark,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::Fetch => "fetch",
            Stage::Extract => "extract",
            Stage::Publish => "publish",
            Stage::Mark => "mark",
        };
        f.write_str(name)
    }
}

/// Terminal result of a successful update attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// A newer version was fetched, published, and marked done
    Updated {
        /// The version that is now mirrored
        version: String,
    },
    /// The mirrored version already matches the vendor's published version
    UpToDate {
        /// The version currently published by the vendor
        version: String,
    },
}

impl UpdateOutcome {
    /// Whether this outcome performed a publish
    pub fn updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated { .. })
    }

    /// The vendor's latest version associated with this outcome
    pub fn version(&self) -> &str {
        match self {
            UpdateOutcome::Updated { version } | UpdateOutcome::UpToDate { version } => version,
        }
    }
}
