//! Venue seat handlers: availability, hold details, hold and reserve.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::{
    HoldSeatsRequest, LevelHoldDetailDto, LevelQuery, ReserveSeatsRequest, ReserveSeatsResponse,
    SeatHoldDto, SeatsAvailableResponse,
};
use crate::app_state::AppState;
use crate::domain::HoldId;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /venue/seats/available`: Seats neither held nor reserved.
///
/// # Errors
///
/// Returns [`GatewayError::LevelNotFound`] for an unknown level.
#[utoipa::path(
    get,
    path = "/api/v1/venue/seats/available",
    tag = "Venue",
    summary = "Count available seats",
    description = "Number of seats that are neither held nor reserved, on one level or across the venue. Expired holds are released before counting.",
    params(LevelQuery),
    responses(
        (status = 200, description = "Available seat count", body = SeatsAvailableResponse),
        (status = 404, description = "Venue level not found", body = ErrorResponse),
    )
)]
pub async fn seats_available(
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let available = state.hold_service.num_seats_available(query.level)?;
    Ok(Json(SeatsAvailableResponse {
        level: query.level,
        available,
    }))
}

/// `GET /venue/holds`: Live holds grouped by level.
///
/// # Errors
///
/// Returns [`GatewayError::LevelNotFound`] for an unknown level.
#[utoipa::path(
    get,
    path = "/api/v1/venue/holds",
    tag = "Venue",
    summary = "List holds per level",
    description = "Live holds (confirmed or not) for one level or every level, with per-level availability.",
    params(LevelQuery),
    responses(
        (status = 200, description = "Per-level hold details", body = Vec<LevelHoldDetailDto>),
        (status = 404, description = "Venue level not found", body = ErrorResponse),
    )
)]
pub async fn hold_details(
    State(state): State<AppState>,
    Query(query): Query<LevelQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let details: Vec<LevelHoldDetailDto> = state
        .hold_service
        .hold_details(query.level)?
        .iter()
        .map(LevelHoldDetailDto::from)
        .collect();
    Ok(Json(details))
}

/// `POST /venue/holds`: Find and hold seats for a customer.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on bad input and
/// [`GatewayError::NoSeatsAvailable`] when no level in range has room.
#[utoipa::path(
    post,
    path = "/api/v1/venue/holds",
    tag = "Venue",
    summary = "Find and hold seats",
    description = "Holds the requested number of seats on the highest level within [min_level, max_level] that can seat them together. The hold expires unless reserved.",
    request_body = HoldSeatsRequest,
    responses(
        (status = 201, description = "Seats held", body = SeatHoldDto),
        (status = 204, description = "Zero seats requested; nothing held"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "No seats available", body = ErrorResponse),
    )
)]
pub async fn hold_seats(
    State(state): State<AppState>,
    Json(req): Json<HoldSeatsRequest>,
) -> Result<Response, GatewayError> {
    let hold = state.hold_service.find_and_hold_seats(
        req.num_seats,
        req.min_level,
        req.max_level,
        &req.customer_email,
    )?;

    Ok(match hold {
        Some(hold) => (StatusCode::CREATED, Json(SeatHoldDto::from(hold.as_ref()))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// `PUT /venue/holds/{id}/reserve`: Commit held seats for their customer.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for an unknown hold or a
/// customer mismatch and [`GatewayError::HoldNotFound`] for an expired hold.
#[utoipa::path(
    put,
    path = "/api/v1/venue/holds/{id}/reserve",
    tag = "Venue",
    summary = "Reserve held seats",
    description = "Confirms a hold so it no longer expires and returns a confirmation code. The customer email must match the one the hold was made for.",
    params(
        ("id" = u64, Path, description = "Hold identifier"),
    ),
    request_body = ReserveSeatsRequest,
    responses(
        (status = 200, description = "Seats reserved", body = ReserveSeatsResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Hold expired or not found", body = ErrorResponse),
    )
)]
pub async fn reserve_seats(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ReserveSeatsRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let hold_id = HoldId::new(id);
    let confirmation_code = state
        .hold_service
        .reserve_seats(hold_id, &req.customer_email)?;

    Ok(Json(ReserveSeatsResponse {
        hold_id,
        confirmation_code,
    }))
}

/// Venue seat routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venue/seats/available", get(seats_available))
        .route("/venue/holds", get(hold_details).post(hold_seats))
        .route("/venue/holds/{id}/reserve", put(reserve_seats))
}
