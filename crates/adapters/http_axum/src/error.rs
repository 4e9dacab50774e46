//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Failures surfaced by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No reconciliation cycle has completed yet.
    Unavailable,
    /// The snapshot holds no entry of `kind` called `name`.
    NotFound { kind: &'static str, name: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "hub state not available yet".to_string(),
            ),
            Self::NotFound { kind, name } => {
                (StatusCode::NOT_FOUND, format!("{kind} {name:?} not found"))
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
