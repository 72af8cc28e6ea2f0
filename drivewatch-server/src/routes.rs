use axum::{Router, http::HeaderValue, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;
use crate::websocket::websocket_handler;

/// Assemble the full application router.
pub fn create_router(state: AppState) -> Router {
    let cors = if state.config.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/api/files", get(handlers::list_files))
        .route("/api/status", get(handlers::service_status))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
