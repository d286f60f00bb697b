//! REST API server module
//!
//! Exposes the on-demand update entry point plus health and OpenAPI
//! endpoints.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::updater::GeoUpdater;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod error_response;
pub mod routes;
pub mod state;

pub use state::AppState;

/// OpenAPI documentation for the geomirror REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "geomirror REST API",
        version = "0.1.0",
        description = "On-demand mirroring of GeoIP edition archives into object storage"
    ),
    paths(
        routes::trigger_update,
        routes::health_check,
        routes::openapi_spec,
    ),
    components(schemas(
        routes::UpdateRequest,
        routes::UpdateResponse,
        crate::types::EditionId,
        crate::types::ArchiveFormat,
        crate::types::Stage,
        crate::types::UpdateOutcome,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    ))
)]
pub struct ApiDoc;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /update` - Bring one edition up to the vendor's latest version
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/update", post(routes::trigger_update))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server on the configured bind address.
///
/// Serves until `cancel` fires, then shuts down gracefully; an update already
/// past its last cancellation checkpoint is allowed to finish.
pub async fn start_api_server(
    updater: Arc<GeoUpdater>,
    config: Arc<Config>,
    cancel: CancellationToken,
) -> Result<()> {
    let bind_address = config.api.bind_address;
    let state = AppState::new(updater, config, cancel.clone());
    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}
