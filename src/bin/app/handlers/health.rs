use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    http::StatusCode,
};
use serde_json::json;
use tracing::warn;
use crate::types::AppState;

// handlers/health.rs
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.scan_patients(None).await {
        Ok(_) => Json(json!({ "status": "ok" })).into_response(),
        Err(e) => {
            warn!(error = %e, "health check could not reach the record store");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}
