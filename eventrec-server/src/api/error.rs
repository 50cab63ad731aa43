//! HTTP error mapping
//!
//! Every failure leaves the server as `{"error": "..."}` with a status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eventrec_common::Error;
use serde_json::json;
use tracing::warn;

#[derive(Debug)]
pub enum ApiError {
    /// No user header on a protected route
    LoginRequired,
    /// Session lacks the role the route needs
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    /// Upload host rejected or never answered
    Upstream(String),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::ValidationFailed(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::UploadFailed(msg) => ApiError::Upstream(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::LoginRequired => (StatusCode::UNAUTHORIZED, "login required".to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, format!("Upload failed: {}", msg)),
            ApiError::Internal(msg) => {
                warn!("Request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
