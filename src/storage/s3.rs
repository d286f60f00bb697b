//! S3-compatible object store backend
//!
//! Targets AWS S3 and S3-compatible services (GCS interop, MinIO, Backblaze)
//! with explicit credentials and an optional custom endpoint. Path-style
//! addressing is forced for compatibility with non-AWS services.

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use std::path::Path;

use super::ObjectStore;

/// Object store backed by an S3-compatible bucket
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a backend from the storage configuration.
    ///
    /// SDK-level retries are disabled: retry policy belongs to the caller of
    /// the update pipeline, not to the transport.
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "geomirror-config",
        );
        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled())
            .force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        }
    }

    /// The bucket this store writes to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn store_error(key: &str, err: impl std::fmt::Display) -> Error {
        Error::Store {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match response {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| Self::store_error(key, e))?
                    .into_bytes();
                Ok(Some(bytes.to_vec()))
            }
            Err(err) => {
                // Absent keys are the first-sync case, not a failure
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    return Ok(None);
                }
                Err(Self::store_error(key, DisplayErrorContext(&err)))
            }
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Self::store_error(key, DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn put_file(&self, key: &str, path: &Path) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| Self::store_error(key, e))?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| Self::store_error(key, DisplayErrorContext(&e)))?;
        Ok(())
    }
}
