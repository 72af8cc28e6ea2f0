//! HTTP query surface: read-only views over the engine state.

use axum::{Json, extract::State};

use drivewatch_model::{ListingReport, ServiceStatus};

use crate::state::AppState;

/// `GET /api/files` — merged client-facing file view.
pub async fn list_files(State(state): State<AppState>) -> Json<ListingReport> {
    Json(state.engine.listing_report().await)
}

/// `GET /api/status` — authorization, polling, and folder configuration.
pub async fn service_status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.engine.service_status().await)
}
