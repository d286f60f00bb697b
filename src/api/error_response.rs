//! Error-to-HTTP-response conversion
//!
//! Route handlers return `Error` directly; the status comes from
//! [`ToHttpStatus`] and the JSON body from the `Error -> ApiError`
//! conversion, so update failures carry the same code/message/details shape
//! everywhere in the API.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // A bare ApiError has no domain variant to map a status from; 500 is
        // the only honest answer. Handlers that know better (validation)
        // pair the body with an explicit status instead.
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
