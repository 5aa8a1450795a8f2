use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown for any upstream failure; details stay in the logs.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Backend request failed: {0}")]
    Backend(#[from] reqwest::Error),
    #[error("Backend response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Backend(e) => {
                tracing::error!("Backend request failed: {}", e);
                (StatusCode::BAD_GATEWAY, FETCH_FAILED_MESSAGE.to_string())
            }
            AppError::Decode(e) => {
                tracing::error!("Backend response could not be decoded: {}", e);
                (StatusCode::BAD_GATEWAY, FETCH_FAILED_MESSAGE.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
