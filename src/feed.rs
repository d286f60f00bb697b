//! Vendor feed request construction
//!
//! One URL serves both the metadata-only version probe (HEAD) and the full
//! archive payload (GET); the resolver and fetcher share this builder so the
//! query-parameter layout lives in exactly one place.

use crate::config::FeedConfig;
use crate::error::{Error, Result};
use crate::types::{ArchiveFormat, EditionId};
use url::Url;

/// Build the download URL for an edition.
///
/// Query parameters identify the edition, the archive suffix, and the access
/// credential. The returned URL embeds the license key — never log it.
pub fn download_url(
    config: &FeedConfig,
    edition: &EditionId,
    format: ArchiveFormat,
) -> Result<Url> {
    let mut url = Url::parse(&config.base_url).map_err(|e| Error::Config {
        message: format!("invalid feed base URL {:?}: {e}", config.base_url),
        key: Some("feed.base_url".into()),
    })?;
    url.query_pairs_mut()
        .append_pair("edition_id", edition.as_str())
        .append_pair("suffix", format.suffix())
        .append_pair("license_key", &config.license_key);
    Ok(url)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> FeedConfig {
        FeedConfig {
            base_url: "https://download.example.com/app/geoip_download".into(),
            license_key: "secret-key".into(),
        }
    }

    #[test]
    fn url_carries_edition_suffix_and_credential() {
        let url = download_url(&feed(), &EditionId::new("GeoLite2-City"), ArchiveFormat::TarGz)
            .unwrap();

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("edition_id".into(), "GeoLite2-City".into())));
        assert!(pairs.contains(&("suffix".into(), "tar.gz".into())));
        assert!(pairs.contains(&("license_key".into(), "secret-key".into())));
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let mut config = feed();
        config.base_url = "not a url".into();

        let err = download_url(&config, &EditionId::new("GeoLite2-City"), ArchiveFormat::Zip)
            .unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("feed.base_url")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }
}
