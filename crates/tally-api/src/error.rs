//! Error types for tally-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tally_core::ErrorDetails;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The backend retrieval behind a reload failed
    #[error("Retrieval failed: {}", .details.message)]
    Retrieval { details: ErrorDetails },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Retrieval { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Retrieval { details } => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        if status.is_server_error() {
            log::warn!("{}", self);
        }
        (status, Json(body)).into_response()
    }
}
