// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::worker::Published;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) published: Published,
}

pub fn app(published: Published) -> Router {
    let state = AppState { published };
    Router::new()
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/stats/fast", get(http::fast_handler)) // GET /api/stats/fast
        .route("/api/stats/details", get(http::details_handler)) // GET /api/stats/details
        .route("/api/history", get(http::history_handler)) // GET /api/history
        .route("/ws/stats", get(ws::ws_stats)) // WS /ws/stats
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
