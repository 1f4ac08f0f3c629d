// src/bin/app/errors.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scribe::ScribeError;
use serde_json::json;
use tracing::{error, warn};

#[derive(Debug)]
pub struct AppError(pub ScribeError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ScribeError::Validation(_) => StatusCode::BAD_REQUEST,
            ScribeError::Unauthorized => StatusCode::UNAUTHORIZED,
            ScribeError::Forbidden(_) => StatusCode::FORBIDDEN,
            ScribeError::NotFound(_) => StatusCode::NOT_FOUND,
            ScribeError::Conflict(_) => StatusCode::CONFLICT,
            ScribeError::Retrieval(_) => StatusCode::SERVICE_UNAVAILABLE,
            ScribeError::Model(_) | ScribeError::Speech(_) | ScribeError::Http(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!(%status, error = %self.0, "request rejected");
        } else {
            error!(%status, error = ?self.0, "request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// Lets handlers use ? on library results
impl From<ScribeError> for AppError {
    fn from(e: ScribeError) -> Self {
        AppError(e)
    }
}
