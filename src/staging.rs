//! Per-edition staging lifecycle
//!
//! Every update stages two transient locations: the downloaded archive file
//! and the extraction working directory. [`StagingArea`] owns both for the
//! duration of one update and removes them when dropped, so cleanup happens
//! on every exit path — success, no-op, or failure — without the orchestrator
//! having to remember it.

use crate::config::StagingConfig;
use crate::types::{ArchiveFormat, EditionId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Staged archive filename layout: `{edition_id}_{version}.{suffix}`
pub fn archive_path(
    config: &StagingConfig,
    edition: &EditionId,
    version: &str,
    format: ArchiveFormat,
) -> PathBuf {
    config
        .download_dir
        .join(format!("{edition}_{version}.{}", format.suffix()))
}

/// Working directory layout: `{work_dir}/{edition_id}`
pub fn work_dir(config: &StagingConfig, edition: &EditionId) -> PathBuf {
    config.work_dir.join(edition.as_str())
}

/// Transient staging paths for one edition update, removed on drop
#[derive(Debug)]
pub struct StagingArea {
    archive: PathBuf,
    work: PathBuf,
}

impl StagingArea {
    /// Create the staging directories for one edition update.
    ///
    /// Both the download directory and the per-edition working directory are
    /// created if absent. The returned guard removes the staged archive and
    /// the working directory when dropped.
    pub async fn acquire(
        config: &StagingConfig,
        edition: &EditionId,
        version: &str,
        format: ArchiveFormat,
    ) -> std::io::Result<Self> {
        let archive = archive_path(config, edition, version, format);
        let work = work_dir(config, edition);

        tokio::fs::create_dir_all(&config.download_dir).await?;
        tokio::fs::create_dir_all(&work).await?;

        debug!(edition = %edition, archive = %archive.display(), work = %work.display(), "staging area acquired");
        Ok(Self { archive, work })
    }

    /// Path the archive payload is staged at
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Per-edition extraction working directory
    pub fn work(&self) -> &Path {
        &self.work
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.archive.exists() {
            if let Err(e) = std::fs::remove_file(&self.archive) {
                warn!(archive = %self.archive.display(), error = %e, "failed to remove staged archive");
            }
        }
        if self.work.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.work) {
                warn!(work = %self.work.display(), error = %e, "failed to remove working directory");
            }
        }
    }
}
