// GET handlers: version, latest tier snapshots, history

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::tier::TierError;
use crate::version::{NAME, VERSION};

impl IntoResponse for TierError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/stats/fast: latest fast-tier snapshot, 503 until the first poll completes.
pub(super) async fn fast_handler(State(state): State<AppState>) -> Response {
    match state.published.fast() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/stats/details: latest detail-tier snapshot, 503 until the first poll completes.
pub(super) async fn details_handler(State(state): State<AppState>) -> Response {
    match state.published.detail() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/history: trend points, oldest first.
pub(super) async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.published.history().await)
}
