//! Durable object storage
//!
//! One bucket serves two purposes: published artifacts live at
//! `{edition_id}/{version}/{filename}` and version markers live at
//! `state/{edition_id}`. The [`ObjectStore`] trait is the seam that lets the
//! orchestrator run against S3-compatible services in production and an
//! in-memory store in tests.

mod memory;
mod s3;

pub use memory::InMemoryStore;
pub use s3::S3Store;

use crate::error::{Error, Result};
use crate::types::EditionId;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Key prefix under which version markers are stored
pub const STATE_PREFIX: &str = "state";

/// Minimal durable blob store interface
///
/// Implementations must tolerate concurrent readers; writers to the same key
/// are serialized by the caller (one update in flight per edition).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object. Returns `Ok(None)` when the key does not exist;
    /// absence is not an error.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object from an in-memory buffer, overwriting unconditionally.
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Write an object from a local file, overwriting unconditionally.
    async fn put_file(&self, key: &str, path: &Path) -> Result<()>;
}

/// Durable last-mirrored version markers, one per edition
///
/// A marker is written only after the corresponding artifact has been fully
/// published for that version; the orchestrator enforces the ordering, this
/// type only owns the key layout.
#[derive(Clone)]
pub struct VersionStore {
    store: Arc<dyn ObjectStore>,
}

impl VersionStore {
    /// Create a version store on top of an object store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Marker key for an edition
    pub fn marker_key(edition: &EditionId) -> String {
        format!("{STATE_PREFIX}/{edition}")
    }

    /// Read the last mirrored version for an edition.
    ///
    /// `Ok(None)` means no marker has ever been written — the first-sync case.
    pub async fn get(&self, edition: &EditionId) -> Result<Option<String>> {
        let key = Self::marker_key(edition);
        let raw = self.store.get(&key).await.map_err(store_error(&key))?;

        let version = raw
            .map(|bytes| {
                String::from_utf8(bytes).map_err(|e| Error::Store {
                    key: key.clone(),
                    reason: format!("marker is not valid UTF-8: {e}"),
                })
            })
            .transpose()?
            .map(|s| s.trim().to_string());

        debug!(edition = %edition, current_version = ?version, "loaded version marker");
        Ok(version)
    }

    /// Record `version` as the last mirrored version for an edition,
    /// overwriting any previous marker.
    pub async fn set(&self, edition: &EditionId, version: &str) -> Result<()> {
        let key = Self::marker_key(edition);
        self.store
            .put(&key, version.as_bytes().to_vec())
            .await
            .map_err(store_error(&key))?;

        debug!(edition = %edition, version, "wrote version marker");
        Ok(())
    }
}

/// Normalize any backend error into `Error::Store` for the given key.
fn store_error(key: &str) -> impl Fn(Error) -> Error + '_ {
    move |e| match e {
        already @ Error::Store { .. } => already,
        other => Error::Store {
            key: key.to_string(),
            reason: other.to_string(),
        },
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_key_uses_state_prefix() {
        let id = EditionId::new("GeoLite2-City");
        assert_eq!(VersionStore::marker_key(&id), "state/GeoLite2-City");
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_edition() {
        let versions = VersionStore::new(Arc::new(InMemoryStore::new()));

        let result = versions.get(&EditionId::new("GeoLite2-City")).await.unwrap();
        assert_eq!(result, None, "absent marker must be None, not an error");
    }

    #[tokio::test]
    async fn set_then_get_round_trips_the_version() {
        let versions = VersionStore::new(Arc::new(InMemoryStore::new()));
        let id = EditionId::new("GeoLite2-City");

        versions.set(&id, "20240101").await.unwrap();
        assert_eq!(versions.get(&id).await.unwrap().as_deref(), Some("20240101"));
    }

    #[tokio::test]
    async fn set_overwrites_unconditionally() {
        let versions = VersionStore::new(Arc::new(InMemoryStore::new()));
        let id = EditionId::new("GeoLite2-ASN");

        versions.set(&id, "20240101").await.unwrap();
        versions.set(&id, "20240215").await.unwrap();
        assert_eq!(versions.get(&id).await.unwrap().as_deref(), Some("20240215"));
    }

    #[tokio::test]
    async fn markers_are_namespaced_per_edition() {
        let store = Arc::new(InMemoryStore::new());
        let versions = VersionStore::new(store.clone());

        versions.set(&EditionId::new("GeoLite2-City"), "1").await.unwrap();
        versions.set(&EditionId::new("GeoLite2-ASN"), "2").await.unwrap();

        assert_eq!(
            versions.get(&EditionId::new("GeoLite2-City")).await.unwrap().as_deref(),
            Some("1")
        );
        assert_eq!(
            versions.get(&EditionId::new("GeoLite2-ASN")).await.unwrap().as_deref(),
            Some("2")
        );
    }

    #[tokio::test]
    async fn get_trims_surrounding_whitespace() {
        let store = Arc::new(InMemoryStore::new());
        store.put("state/GeoLite2-City", b"20240101\n".to_vec()).await.unwrap();

        let versions = VersionStore::new(store);
        assert_eq!(
            versions.get(&EditionId::new("GeoLite2-City")).await.unwrap().as_deref(),
            Some("20240101"),
            "markers written with a trailing newline must still compare cleanly"
        );
    }
}
