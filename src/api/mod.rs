//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; system endpoints at the
//! root. The OpenAPI document is served at `/api-docs/openapi.json` with a
//! Swagger UI at `/swagger-ui` when the `swagger-ui` feature is enabled.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "venue-gateway",
        description = "Time-bounded seat holds and reservations for a multi-level venue."
    ),
    paths(
        handlers::venue::seats_available,
        handlers::venue::hold_details,
        handlers::venue::hold_seats,
        handlers::venue::reserve_seats,
        handlers::system::health_handler,
        handlers::system::venue_layout_handler,
    ),
    components(schemas(
        dto::HoldSeatsRequest,
        dto::SeatHoldDto,
        dto::ReserveSeatsRequest,
        dto::ReserveSeatsResponse,
        dto::LevelHoldDetailDto,
        dto::SeatsAvailableResponse,
        handlers::system::HealthResponse,
        crate::domain::HoldId,
        crate::domain::SeatLevel,
        crate::domain::VenueLayout,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Venue", description = "Seat availability, holds and reservations"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

/// Builds the servable application: routes, middleware and state.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router()
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
