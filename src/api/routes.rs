//! Route handlers: on-demand updates, health, OpenAPI spec.

use crate::api::AppState;
use crate::error::ApiError;
use crate::types::{ArchiveFormat, EditionId};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

/// Request body for an on-demand edition update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequest {
    /// Edition to update (e.g. `GeoLite2-City`)
    pub edition_id: Option<String>,

    /// Vendor archive suffix: `tar.gz` or `zip`
    pub suffix: Option<String>,

    /// Republish even when the mirrored version already matches
    #[serde(default)]
    pub force_update: bool,
}

/// Response body for a completed update request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateResponse {
    /// The edition that was processed
    pub edition_id: String,

    /// Whether a publish happened (false: already up to date)
    pub updated: bool,

    /// The vendor's latest published version
    pub latest_version: String,
}

/// POST /update - Bring one edition up to the vendor's latest version
#[utoipa::path(
    post,
    path = "/update",
    tag = "updates",
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Update completed or edition already current", body = UpdateResponse),
        (status = 400, description = "Missing or invalid request fields", body = ApiError),
        (status = 422, description = "Downloaded archive was unusable", body = ApiError),
        (status = 502, description = "Vendor feed unreachable or unparsable", body = ApiError),
        (status = 503, description = "Shutting down", body = ApiError)
    )
)]
pub async fn trigger_update(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> Response {
    let Some(edition_id) = request.edition_id.filter(|id| !id.is_empty()) else {
        return validation_response("edition_id is required");
    };
    let Some(suffix) = request.suffix.filter(|s| !s.is_empty()) else {
        return validation_response("suffix is required");
    };
    let format = match suffix.parse::<ArchiveFormat>() {
        Ok(format) => format,
        Err(e) => return e.into_response(),
    };

    let edition = EditionId::new(edition_id);
    info!(edition = %edition, format = %format, force = request.force_update, "update requested");

    // One in-flight update per edition; later requests wait their turn
    let lock = state.edition_lock(&edition);
    let _guard = lock.lock().await;

    match state
        .updater
        .update(&edition, format, request.force_update, &state.cancel)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(UpdateResponse {
                edition_id: edition.to_string(),
                updated: outcome.updated(),
                latest_version: outcome.version().to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

fn validation_response(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::validation(message)),
    )
        .into_response()
}
