//! Batch runs over an edition catalog
//!
//! Editions are processed sequentially in catalog order. A failing edition is
//! recorded and the run moves on; one broken feed entry must not starve the
//! rest of the catalog. Cancellation stops between editions and between
//! stages within an edition.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::UpdateOutcome;
use crate::updater::GeoUpdater;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Result of one edition within a batch run
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditionResult {
    /// The update ran to completion
    Ok(UpdateOutcome),
    /// The update failed; the message is the error's display form
    Failed(String),
}

/// Aggregated outcome of a batch run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Per-edition results in catalog order
    pub results: Vec<(String, EditionResult)>,
}

impl BatchSummary {
    /// Number of editions that published a new version
    pub fn updated(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, EditionResult::Ok(outcome) if outcome.updated()))
            .count()
    }

    /// Number of editions already at the vendor's latest version
    pub fn up_to_date(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| matches!(r, EditionResult::Ok(outcome) if !outcome.updated()))
            .count()
    }

    /// Editions that failed, with their error messages
    pub fn failed(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter_map(|(id, r)| match r {
                EditionResult::Failed(message) => Some((id.as_str(), message.as_str())),
                EditionResult::Ok(_) => None,
            })
            .collect()
    }

    /// Whether any edition failed
    pub fn has_failures(&self) -> bool {
        self.results
            .iter()
            .any(|(_, r)| matches!(r, EditionResult::Failed(_)))
    }
}

/// Runs every catalogued edition through the updater
pub struct BatchRunner {
    updater: GeoUpdater,
}

impl BatchRunner {
    /// Create a runner over a wired updater
    pub fn new(updater: GeoUpdater) -> Self {
        Self { updater }
    }

    /// Update every edition in the catalog and return a per-edition summary.
    ///
    /// Only cancellation observed between editions ends the run early; the
    /// editions not yet attempted are simply absent from the summary.
    pub async fn run(
        &self,
        catalog: &Catalog,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for edition in catalog.editions() {
            if cancel.is_cancelled() {
                info!(
                    attempted = summary.results.len(),
                    remaining = catalog.len() - summary.results.len(),
                    "batch run cancelled"
                );
                break;
            }

            let result = match self
                .updater
                .update(&edition.id, edition.format, force, cancel)
                .await
            {
                Ok(outcome) => EditionResult::Ok(outcome),
                Err(e) => {
                    error!(edition = %edition.id, error = %e, "edition update failed");
                    EditionResult::Failed(e.to_string())
                }
            };
            summary.results.push((edition.id.to_string(), result));
        }

        info!(
            updated = summary.updated(),
            up_to_date = summary.up_to_date(),
            failed = summary.failed().len(),
            "batch run finished"
        );
        Ok(summary)
    }
}
