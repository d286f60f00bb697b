//! Application state for the API server

use crate::config::Config;
use crate::types::EditionId;
use crate::updater::GeoUpdater;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Shared application state accessible to all route handlers
///
/// Cloned per request (cheap Arc clones). Holds the wired updater plus a map
/// of per-edition locks: the updater requires at most one in-flight update
/// per edition, so concurrent requests for the same edition queue up here
/// instead of racing each other.
#[derive(Clone)]
pub struct AppState {
    /// The wired update orchestrator
    pub updater: Arc<GeoUpdater>,

    /// Configuration (read access)
    pub config: Arc<Config>,

    /// Token observed between update stages; cancelled on shutdown
    pub cancel: CancellationToken,

    locks: Arc<Mutex<HashMap<EditionId, Arc<tokio::sync::Mutex<()>>>>>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(updater: Arc<GeoUpdater>, config: Arc<Config>, cancel: CancellationToken) -> Self {
        Self {
            updater,
            config,
            cancel,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The serialization lock for one edition, created on first use.
    pub fn edition_lock(&self, edition: &EditionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(edition.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
