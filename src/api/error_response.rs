//! HTTP error response handling for the API
//!
//! Converts domain errors into HTTP responses with appropriate status
//! codes and JSON error bodies, so handlers can simply return
//! `Result<_, Error>`.

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
        // Default to 500 when an ApiError is returned directly
        // (domain errors normally go through Error::into_response)
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}
