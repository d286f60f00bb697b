//! Configuration types for geomirror

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Environment variable overriding `feed.license_key`
pub const LICENSE_KEY_ENV: &str = "GEOIP_LICENSE_KEY";

/// Environment variable overriding `storage.bucket`
pub const BUCKET_ENV: &str = "GEOIP_BUCKET";

/// Vendor feed configuration
///
/// The feed serves both the metadata-only version probe and the full archive
/// payload from the same URL, selected by HTTP method.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedConfig {
    /// Base download URL (default: the MaxMind GeoIP download endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access credential sent as the `license_key` query parameter
    ///
    /// May be left empty in the file and supplied via `GEOIP_LICENSE_KEY`.
    #[serde(default)]
    pub license_key: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            license_key: String::new(),
        }
    }
}

/// Artifact repository and version-marker store configuration
///
/// Targets any S3-compatible service (AWS S3, GCS interop, MinIO, Backblaze)
/// via explicit credentials and an optional custom endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Bucket holding both published artifacts and `state/` version markers
    ///
    /// May be left empty in the file and supplied via `GEOIP_BUCKET`.
    #[serde(default)]
    pub bucket: String,

    /// Region name (provider-specific for non-AWS services)
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL for S3-compatible services (None = AWS S3)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Access key ID
    #[serde(default)]
    pub access_key_id: String,

    /// Secret access key
    #[serde(default)]
    pub secret_access_key: String,
}

/// Transient staging storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StagingConfig {
    /// Directory for staged archive downloads (default: `<tmp>/geomirror_downloads`)
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Root for per-edition extraction working directories (default: `<tmp>/geomirror_tmp`)
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            work_dir: default_work_dir(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6789)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Main configuration for geomirror
///
/// Constructed once at process start and passed by reference into each
/// component's constructor; there is no ambient global settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Vendor feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Object storage settings (artifact repository + version markers)
    #[serde(default)]
    pub storage: StorageConfig,

    /// Transient staging directories
    #[serde(default)]
    pub staging: StagingConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Enable verbose (debug-level) logging
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from an optional JSON file, then apply environment
    /// overrides and validate required settings.
    ///
    /// With no file, defaults plus environment variables must supply the
    /// license key and bucket.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEOIP_LICENSE_KEY` / `GEOIP_BUCKET` environment overrides.
    ///
    /// An environment value always wins over the file value.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(LICENSE_KEY_ENV) {
            if !key.is_empty() {
                self.feed.license_key = key;
            }
        }
        if let Ok(bucket) = std::env::var(BUCKET_ENV) {
            if !bucket.is_empty() {
                self.storage.bucket = bucket;
            }
        }
    }

    /// Validate settings every run depends on.
    pub fn validate(&self) -> Result<()> {
        if self.feed.license_key.is_empty() {
            return Err(Error::Config {
                message: format!("license key is not set (config file or {LICENSE_KEY_ENV})"),
                key: Some("feed.license_key".into()),
            });
        }
        if self.storage.bucket.is_empty() {
            return Err(Error::Config {
                message: format!("storage bucket is not set (config file or {BUCKET_ENV})"),
                key: Some("storage.bucket".into()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://download.maxmind.com/app/geoip_download".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("geomirror_downloads")
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("geomirror_tmp")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6789))
}
