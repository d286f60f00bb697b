//! Per-edition update orchestration
//!
//! [`GeoUpdater`] drives one edition through resolve, fetch, extract,
//! publish, and mark. The version marker is written strictly after the full
//! member set is published, so a marker never claims a version whose
//! artifacts are missing. Staging is owned by a guard and cleaned up on every
//! exit path. No stage is retried here.

use crate::config::{Config, StagingConfig};
use crate::error::{Error, Result};
use crate::extractor::ArchiveExtractor;
use crate::fetcher::ArchiveFetcher;
use crate::publisher::Publisher;
use crate::resolver::MetadataResolver;
use crate::staging::StagingArea;
use crate::storage::{ObjectStore, VersionStore};
use crate::types::{ArchiveFormat, EditionId, Stage, UpdateOutcome};
use crate::version;
use std::cmp::Ordering;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Orchestrates single-edition updates against a vendor feed and an object
/// store
#[derive(Clone)]
pub struct GeoUpdater {
    resolver: MetadataResolver,
    fetcher: ArchiveFetcher,
    extractor: ArchiveExtractor,
    publisher: Publisher,
    versions: VersionStore,
    staging: StagingConfig,
}

impl GeoUpdater {
    /// Wire an updater from configuration and an object store.
    ///
    /// The HTTP client is shared between the metadata resolver and the
    /// archive fetcher.
    pub fn new(config: &Config, store: Arc<dyn ObjectStore>) -> Self {
        let client = reqwest::Client::new();
        Self {
            resolver: MetadataResolver::new(client.clone(), config.feed.clone()),
            fetcher: ArchiveFetcher::new(
                client,
                config.feed.clone(),
                config.staging.clone(),
            ),
            extractor: ArchiveExtractor::new(),
            publisher: Publisher::new(store.clone()),
            versions: VersionStore::new(store),
            staging: config.staging.clone(),
        }
    }

    /// Bring one edition up to the vendor's latest published version.
    ///
    /// Resolves the latest version, compares it against the durable marker,
    /// and either reports [`UpdateOutcome::UpToDate`] or runs the fetch,
    /// extract, publish, mark sequence. `force` republishes even when the
    /// versions match. Cancellation is observed between stages; a stage
    /// already running completes before the token takes effect.
    pub async fn update(
        &self,
        edition: &EditionId,
        format: ArchiveFormat,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<UpdateOutcome> {
        checkpoint(cancel, Stage::Resolve)?;
        let current = self.versions.get(edition).await?;
        let latest = self.resolver.resolve(edition, format).await?;

        if !version::update_required(current.as_deref(), &latest, force) {
            info!(edition = %edition, version = %latest, "edition is up to date");
            return Ok(UpdateOutcome::UpToDate { version: latest });
        }

        if let Some(current) = &current {
            if version::numeric_cmp(&latest, current) == Ordering::Less {
                warn!(
                    edition = %edition,
                    current_version = %current,
                    latest_version = %latest,
                    "vendor published an older version; mirroring it anyway"
                );
            }
        }

        checkpoint(cancel, Stage::Fetch)?;
        let staging = StagingArea::acquire(&self.staging, edition, &latest, format).await?;
        self.fetcher.fetch(edition, format, &latest).await?;

        checkpoint(cancel, Stage::Extract)?;
        self.extractor
            .extract(staging.archive(), format, staging.work())
            .await?;

        checkpoint(cancel, Stage::Publish)?;
        let published = self
            .publisher
            .publish(staging.work(), edition, &latest, format)
            .await?;

        checkpoint(cancel, Stage::Mark)?;
        self.versions
            .set(edition, &latest)
            .await
            .map_err(|e| Error::StaleMarker {
                edition: edition.to_string(),
                version: latest.clone(),
                reason: e.to_string(),
            })?;

        info!(
            edition = %edition,
            version = %latest,
            previous_version = ?current,
            members = published,
            "edition updated"
        );
        Ok(UpdateOutcome::Updated { version: latest })
    }
}

fn checkpoint(cancel: &CancellationToken, stage: Stage) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled { stage });
    }
    Ok(())
}
