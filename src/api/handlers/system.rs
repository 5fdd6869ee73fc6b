//! System endpoints: health check and venue layout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::VenueLayout;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// `GET /config/venue`: Seating layout the gateway serves.
#[utoipa::path(
    get,
    path = "/config/venue",
    tag = "System",
    summary = "Venue layout",
    description = "Returns the seating levels and hold lifetime the gateway was started with.",
    responses(
        (status = 200, description = "Venue layout", body = VenueLayout),
    )
)]
pub async fn venue_layout_handler(State(state): State<AppState>) -> impl IntoResponse {
    let layout = state.hold_service.venue().layout().clone();
    (StatusCode::OK, Json(layout))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/venue", get(venue_layout_handler))
}
