use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Transport-level failures: caller-side contract violations (`spec.md` §7,
/// "validation") rejected outright rather than encoded as `{success: false}`
/// in a well-formed response body.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("{0}")]
    InvalidArgument(String),
}

impl IntoResponse for FacadeError {
    fn into_response(self) -> Response {
        let FacadeError::InvalidArgument(message) = self;
        (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
