//! Error types for geomirror
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants for each stage of an edition update
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::Stage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for geomirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for geomirror
///
/// Each variant carries enough context to identify the edition and stage that
/// failed. None of these are retried within the library; retry policy, if
/// desired, belongs to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed.license_key")
        key: Option<String>,
    },

    /// Vendor metadata unreachable or unparsable
    #[error("failed to resolve latest version for {edition}: {reason}")]
    Resolution {
        /// The edition whose version could not be resolved
        edition: String,
        /// Why resolution failed (status code, missing header, bad pattern)
        reason: String,
    },

    /// Archive download failed (transport or interrupted stream)
    #[error("download failed for {edition}: {reason}")]
    Download {
        /// The edition whose archive download failed
        edition: String,
        /// Why the download failed
        reason: String,
    },

    /// Archive extraction failed (corrupt or unexpected contents)
    #[error("extraction failed for {archive}: {reason}")]
    Extract {
        /// The archive file that failed to extract
        archive: PathBuf,
        /// Why extraction failed
        reason: String,
    },

    /// Artifact repository write failed during publish
    #[error("publish failed for object {key}: {reason}")]
    Publish {
        /// The object key whose copy failed
        key: String,
        /// Why the copy failed
        reason: String,
    },

    /// Version-marker store read/write failure
    #[error("version store error for {key}: {reason}")]
    Store {
        /// The store key involved
        key: String,
        /// Why the store operation failed
        reason: String,
    },

    /// Marker write failed *after* a successful publish
    ///
    /// The artifact for `version` is live in the repository but the durable
    /// marker still points at the previous version. Re-running the update is
    /// the safe recovery: the version mismatch is re-detected and the publish
    /// is idempotent.
    #[error(
        "version marker write failed for {edition} after publishing {version}: {reason} \
         (artifact is live, marker is stale; re-run to reconcile)"
    )]
    StaleMarker {
        /// The edition whose marker is now stale
        edition: String,
        /// The version that was published but not recorded
        version: String,
        /// Why the marker write failed
        reason: String,
    },

    /// Update cancelled by the caller before the named stage ran
    #[error("update cancelled before {stage} stage")]
    Cancelled {
        /// The stage that was about to run when cancellation was observed
        stage: Stage,
    },

    /// Unrecognized archive format suffix
    #[error("unsupported archive format: {0}")]
    InvalidFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServer(String),
}

/// API error response format
///
/// Returned by API endpoints when an error occurs. Standard format with a
/// machine-readable error code, a human-readable message, and optional
/// contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "resolution_error",
///     "message": "failed to resolve latest version for GeoLite2-City: status 401",
///     "details": {
///       "edition_id": "GeoLite2-City"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "resolution_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::InvalidFormat(_) => 400,

            // 422 Unprocessable Entity - payload was fetched but unusable
            Error::Extract { .. } => 422,

            // 500 Internal Server Error - Server-side issues
            Error::Publish { .. } => 500,
            Error::Store { .. } => 500,
            Error::StaleMarker { .. } => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServer(_) => 500,

            // 502 Bad Gateway - vendor feed errors
            Error::Resolution { .. } => 502,
            Error::Download { .. } => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable
            Error::Cancelled { .. } => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Resolution { .. } => "resolution_error",
            Error::Download { .. } => "download_error",
            Error::Extract { .. } => "extract_error",
            Error::Publish { .. } => "publish_error",
            Error::Store { .. } => "store_error",
            Error::StaleMarker { .. } => "stale_marker",
            Error::Cancelled { .. } => "cancelled",
            Error::InvalidFormat(_) => "invalid_format",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServer(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Resolution { edition, .. } | Error::Download { edition, .. } => {
                Some(serde_json::json!({
                    "edition_id": edition,
                }))
            }
            Error::StaleMarker {
                edition, version, ..
            } => Some(serde_json::json!({
                "edition_id": edition,
                "published_version": version,
            })),
            Error::Publish { key, .. } | Error::Store { key, .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Extract { archive, .. } => Some(serde_json::json!({
                "archive": archive,
            })),
            Error::Cancelled { stage } => Some(serde_json::json!({
                "stage": stage,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_status_code, expected_error_code) for every
    /// reachable match arm in ToHttpStatus.
    fn all_error_variants() -> Vec<(Error, u16, &'static str)> {
        vec![
            (
                Error::Config {
                    message: "license key is not set".into(),
                    key: Some("feed.license_key".into()),
                },
                400,
                "config_error",
            ),
            (
                Error::InvalidFormat("tar.xz".into()),
                400,
                "invalid_format",
            ),
            (
                Error::Extract {
                    archive: PathBuf::from("GeoLite2-City_20240101.tar.gz"),
                    reason: "invalid gzip header".into(),
                },
                422,
                "extract_error",
            ),
            (
                Error::Publish {
                    key: "GeoLite2-City/20240101/GeoLite2-City.mmdb".into(),
                    reason: "access denied".into(),
                },
                500,
                "publish_error",
            ),
            (
                Error::Store {
                    key: "state/GeoLite2-City".into(),
                    reason: "timeout".into(),
                },
                500,
                "store_error",
            ),
            (
                Error::StaleMarker {
                    edition: "GeoLite2-City".into(),
                    version: "20240101".into(),
                    reason: "timeout".into(),
                },
                500,
                "stale_marker",
            ),
            (
                Error::Io(std::io::Error::other("disk fail")),
                500,
                "io_error",
            ),
            (
                Error::ApiServer("bind failed".into()),
                500,
                "api_server_error",
            ),
            (
                Error::Resolution {
                    edition: "GeoLite2-City".into(),
                    reason: "status 401".into(),
                },
                502,
                "resolution_error",
            ),
            (
                Error::Download {
                    edition: "GeoLite2-City".into(),
                    reason: "connection reset".into(),
                },
                502,
                "download_error",
            ),
            (
                Error::Cancelled {
                    stage: Stage::Fetch,
                },
                503,
                "cancelled",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_status_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_status = error.status_code();
            assert_eq!(
                actual_status, expected_status,
                "Error variant with error_code={expected_code} returned status {actual_status}, expected {expected_status}"
            );
        }
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let actual_code = error.error_code();
            assert_eq!(
                actual_code, expected_code,
                "Error variant with expected status={expected_status} returned error_code={actual_code}, expected {expected_code}"
            );
        }
    }

    #[test]
    fn resolution_error_is_502_bad_gateway() {
        let err = Error::Resolution {
            edition: "GeoLite2-ASN".into(),
            reason: "missing content-disposition header".into(),
        };
        assert_eq!(err.status_code(), 502);
    }

    #[test]
    fn api_error_from_resolution_has_edition_id() {
        let err = Error::Resolution {
            edition: "GeoLite2-City".into(),
            reason: "status 500".into(),
        };
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "resolution_error");
        let details = api.error.details.expect("should have details");
        assert_eq!(details["edition_id"], "GeoLite2-City");
    }

    #[test]
    fn api_error_from_stale_marker_has_edition_and_version() {
        let err = Error::StaleMarker {
            edition: "GeoLite2-City".into(),
            version: "20240101".into(),
            reason: "connection reset".into(),
        };
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "stale_marker");
        let details = api.error.details.expect("should have details");
        assert_eq!(details["edition_id"], "GeoLite2-City");
        assert_eq!(details["published_version"], "20240101");
    }

    #[test]
    fn api_error_from_publish_has_object_key() {
        let err = Error::Publish {
            key: "GeoLite2-City/20240101/GeoLite2-City.mmdb".into(),
            reason: "access denied".into(),
        };
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "publish_error");
        let details = api.error.details.expect("should have details");
        assert_eq!(details["key"], "GeoLite2-City/20240101/GeoLite2-City.mmdb");
    }

    #[test]
    fn api_error_from_io_has_no_details() {
        let err = Error::Io(std::io::Error::other("disk fail"));
        let api: ApiError = err.into();

        assert_eq!(api.error.code, "io_error");
        assert!(
            api.error.details.is_none(),
            "Io errors should not have structured details"
        );
    }

    #[test]
    fn api_error_message_matches_error_display() {
        let err = Error::Download {
            edition: "GeoLite2-Country".into(),
            reason: "stream interrupted".into(),
        };
        let display_msg = err.to_string();
        let api: ApiError = err.into();

        assert_eq!(
            api.error.message, display_msg,
            "ApiError message should match the Error's Display output"
        );
    }

    #[test]
    fn api_error_validation_factory() {
        let api = ApiError::validation("edition_id is required");

        assert_eq!(api.error.code, "validation_error");
        assert_eq!(api.error.message, "edition_id is required");
        assert!(api.error.details.is_none());
    }

    #[test]
    fn api_error_without_details_omits_details_in_json() {
        let api = ApiError::new("test_code", "test message");

        let json_str = serde_json::to_string(&api).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();

        assert_eq!(parsed["error"]["code"], "test_code");
        assert_eq!(parsed["error"]["message"], "test message");
        assert!(
            parsed["error"].get("details").is_none(),
            "details field should be omitted from JSON when None"
        );
    }

    #[test]
    fn api_error_round_trips_through_json() {
        let original = ApiError::with_details(
            "download_error",
            "download failed for GeoLite2-City: timeout",
            serde_json::json!({"edition_id": "GeoLite2-City"}),
        );

        let json_str = serde_json::to_string(&original).unwrap();
        let deserialized: ApiError = serde_json::from_str(&json_str).unwrap();

        assert_eq!(deserialized.error.code, original.error.code);
        assert_eq!(deserialized.error.message, original.error.message);
        assert_eq!(deserialized.error.details, original.error.details);
    }
}
