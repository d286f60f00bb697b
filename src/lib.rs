//! # geomirror
//!
//! Mirrors versioned GeoIP editions from a vendor download feed into
//! S3-compatible object storage.
//!
//! For each edition the updater resolves the vendor's latest published
//! version from feed metadata, compares it against a durable per-edition
//! marker, and when they differ streams the archive down, extracts it, and
//! publishes the payload members under `{edition_id}/{version}/{filename}`.
//! The marker is only advanced after the publish completes, so a marker never
//! claims artifacts that are not fully in place.
//!
//! ## Quick Start
//!
//! ```no_run
//! use geomirror::{Config, GeoUpdater, InMemoryStore};
//! use geomirror::types::{ArchiveFormat, EditionId};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.feed.license_key = "your-license-key".into();
//!     config.storage.bucket = "your-bucket".into();
//!
//!     let updater = GeoUpdater::new(&config, Arc::new(InMemoryStore::new()));
//!     let outcome = updater
//!         .update(
//!             &EditionId::new("GeoLite2-City"),
//!             ArchiveFormat::TarGz,
//!             false,
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Edition catalog for batch runs
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Archive extraction
pub mod extractor;
/// Vendor feed request construction
pub mod feed;
/// Archive payload download
pub mod fetcher;
/// Durable publication of archive members
pub mod publisher;
/// Vendor version resolution
pub mod resolver;
/// Batch runs over an edition catalog
pub mod runner;
/// Per-edition staging lifecycle
pub mod staging;
/// Object storage backends and version markers
pub mod storage;
/// Core types
pub mod types;
/// Per-edition update orchestration
pub mod updater;
/// Version comparison policy
pub mod version;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use runner::{BatchRunner, BatchSummary};
pub use storage::{InMemoryStore, ObjectStore, S3Store, VersionStore};
pub use types::{ArchiveFormat, Edition, EditionId, Stage, UpdateOutcome};
pub use updater::GeoUpdater;

use tokio_util::sync::CancellationToken;

/// Cancel the token when a termination signal arrives.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// In-flight updates observe the token between stages; a stage already
/// running finishes before the process winds down.
pub async fn cancel_on_signal(cancel: CancellationToken) {
    wait_for_signal().await;
    cancel.cancel();
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
