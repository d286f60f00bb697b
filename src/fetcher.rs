//! Archive payload download to staging storage

use crate::config::{FeedConfig, StagingConfig};
use crate::error::{Error, Result};
use crate::types::{ArchiveFormat, EditionId};
use crate::{feed, staging};
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Streams archive payloads from the vendor feed into the staging directory
#[derive(Clone)]
pub struct ArchiveFetcher {
    client: reqwest::Client,
    feed: FeedConfig,
    staging: StagingConfig,
}

impl ArchiveFetcher {
    /// Create a fetcher over a shared HTTP client
    pub fn new(client: reqwest::Client, feed: FeedConfig, staging: StagingConfig) -> Self {
        Self {
            client,
            feed,
            staging,
        }
    }

    /// Download the archive for an edition at a known version.
    ///
    /// The payload is streamed chunk-by-chunk to
    /// `{download_dir}/{edition_id}_{version}.{suffix}`; the directory is
    /// created if absent. Transport failures and interrupted streams abort
    /// the update; a partially written file is left behind for the staging
    /// cleanup, never retried here.
    pub async fn fetch(
        &self,
        edition: &EditionId,
        format: ArchiveFormat,
        version: &str,
    ) -> Result<PathBuf> {
        let url = feed::download_url(&self.feed, edition, format)?;
        let path = staging::archive_path(&self.staging, edition, version, format);

        tokio::fs::create_dir_all(&self.staging.download_dir)
            .await
            .map_err(|e| self.error(edition, format!("failed to create staging dir: {e}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.error(edition, format!("download request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error(edition, format!("download returned status {status}")));
        }

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| self.error(edition, format!("failed to create staging file: {e}")))?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| self.error(edition, format!("stream interrupted: {e}")))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| self.error(edition, format!("failed to write chunk: {e}")))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| self.error(edition, format!("failed to flush staging file: {e}")))?;

        info!(edition = %edition, version, bytes = written, path = %path.display(), "downloaded archive");
        Ok(path)
    }

    fn error(&self, edition: &EditionId, reason: String) -> Error {
        Error::Download {
            edition: edition.to_string(),
            reason,
        }
    }
}
