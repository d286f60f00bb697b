//! Vendor version resolution from feed metadata
//!
//! The feed announces the currently published version in the
//! `content-disposition` header of its download endpoint, so a metadata-only
//! HEAD request is enough to learn the latest version without pulling the
//! payload.

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::feed;
use crate::types::{ArchiveFormat, EditionId};
use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use std::sync::LazyLock;
use tracing::debug;

/// Matches `filename=<name>_<version>.<ext>` and captures the trailing digit
/// run before the final extension. Greedy matching picks the *last*
/// `_<digits>.` group, so underscores and digits inside the edition name do
/// not confuse it.
static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"filename=.*_(\d+)\.").expect("version pattern is a valid regex")
});

/// Resolves the vendor's currently published version for an edition
#[derive(Clone)]
pub struct MetadataResolver {
    client: reqwest::Client,
    config: FeedConfig,
}

impl MetadataResolver {
    /// Create a resolver over a shared HTTP client
    pub fn new(client: reqwest::Client, config: FeedConfig) -> Self {
        Self { client, config }
    }

    /// Resolve the latest published version for an edition.
    ///
    /// Any failure — transport, non-success status, missing header, or an
    /// unrecognized filename pattern — aborts the update for this edition.
    /// Resolution never silently reports "no update needed".
    pub async fn resolve(&self, edition: &EditionId, format: ArchiveFormat) -> Result<String> {
        let url = feed::download_url(&self.config, edition, format)?;

        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| self.error(edition, format!("metadata request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.error(edition, format!("metadata request returned status {status}")));
        }

        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .ok_or_else(|| self.error(edition, "missing content-disposition header".into()))?
            .to_str()
            .map_err(|e| self.error(edition, format!("unreadable content-disposition: {e}")))?;

        let version = extract_version(disposition)
            .ok_or_else(|| {
                self.error(
                    edition,
                    format!("no version in content-disposition {disposition:?}"),
                )
            })?
            .to_string();

        debug!(edition = %edition, latest_version = %version, "resolved latest version");
        Ok(version)
    }

    fn error(&self, edition: &EditionId, reason: String) -> Error {
        Error::Resolution {
            edition: edition.to_string(),
            reason,
        }
    }
}

/// Extract the version digits from a content-disposition value.
fn extract_version(disposition: &str) -> Option<&str> {
    VERSION_PATTERN
        .captures(disposition)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver_for(server: &MockServer) -> MetadataResolver {
        MetadataResolver::new(
            reqwest::Client::new(),
            FeedConfig {
                base_url: server.uri(),
                license_key: "test-key".into(),
            },
        )
    }

    #[test]
    fn extracts_version_from_tar_gz_disposition() {
        let value = "attachment; filename=GeoLite2-City_20240101.tar.gz";
        assert_eq!(extract_version(value), Some("20240101"));
    }

    #[test]
    fn extracts_version_from_zip_disposition() {
        let value = "attachment; filename=GeoLite2-City-CSV_20240102.zip";
        assert_eq!(extract_version(value), Some("20240102"));
    }

    #[test]
    fn picks_last_digit_group_when_name_contains_digits() {
        let value = "attachment; filename=GeoLite2-City_v2_20240101.tar.gz";
        assert_eq!(extract_version(value), Some("20240101"));
    }

    #[test]
    fn rejects_disposition_without_version() {
        assert_eq!(extract_version("attachment; filename=GeoLite2-City.tar.gz"), None);
        assert_eq!(extract_version("inline"), None);
    }

    #[tokio::test]
    async fn resolve_reads_version_from_head_response() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(query_param("edition_id", "GeoLite2-City"))
            .and(query_param("suffix", "tar.gz"))
            .and(query_param("license_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).insert_header(
                "content-disposition",
                "attachment; filename=GeoLite2-City_20240101.tar.gz",
            ))
            .mount(&server)
            .await;

        let version = resolver_for(&server)
            .resolve(&EditionId::new("GeoLite2-City"), ArchiveFormat::TarGz)
            .await
            .unwrap();

        assert_eq!(version, "20240101");
    }

    #[tokio::test]
    async fn resolve_fails_on_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = resolver_for(&server)
            .resolve(&EditionId::new("GeoLite2-City"), ArchiveFormat::TarGz)
            .await
            .unwrap_err();

        match err {
            Error::Resolution { edition, reason } => {
                assert_eq!(edition, "GeoLite2-City");
                assert!(reason.contains("401"), "reason should name the status: {reason}");
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_fails_when_header_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let err = resolver_for(&server)
            .resolve(&EditionId::new("GeoLite2-City"), ArchiveFormat::TarGz)
            .await
            .unwrap_err();

        match err {
            Error::Resolution { reason, .. } => {
                assert!(
                    reason.contains("content-disposition"),
                    "reason should name the missing header: {reason}"
                );
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn resolve_fails_on_unrecognized_filename_pattern() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-disposition", "attachment; filename=readme.txt"),
            )
            .mount(&server)
            .await;

        let err = resolver_for(&server)
            .resolve(&EditionId::new("GeoLite2-City"), ArchiveFormat::TarGz)
            .await
            .unwrap_err();

        assert!(
            matches!(err, Error::Resolution { .. }),
            "unparsable filename must abort resolution, got {err:?}"
        );
    }
}
