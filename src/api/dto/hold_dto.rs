//! Seat hold DTOs for hold, reserve and detail operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{HoldId, Lease};
use crate::service::LevelHolds;

/// Request body for `POST /venue/holds`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HoldSeatsRequest {
    /// Number of seats to hold. Zero holds nothing.
    pub num_seats: i64,
    /// Lowest level to consider. Defaults to the lowest venue level.
    #[serde(default)]
    pub min_level: Option<i64>,
    /// Highest level to consider. Defaults to the highest venue level.
    #[serde(default)]
    pub max_level: Option<i64>,
    /// Customer the hold is made for.
    pub customer_email: String,
}

/// A seat hold as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeatHoldDto {
    /// Hold identifier.
    pub hold_id: HoldId,
    /// Venue level the seats are on.
    pub level: u32,
    /// Customer the hold belongs to.
    pub customer_email: String,
    /// Number of seats held.
    pub seat_count: usize,
    /// Whether the hold is a confirmed reservation.
    pub confirmed: bool,
    /// When the hold was granted.
    pub created_at: DateTime<Utc>,
}

impl From<&Lease<String>> for SeatHoldDto {
    fn from(hold: &Lease<String>) -> Self {
        Self {
            hold_id: hold.id(),
            level: hold.pool_id(),
            customer_email: hold.payload(),
            seat_count: hold.slot_count(),
            confirmed: hold.is_confirmed(),
            created_at: hold.created_at(),
        }
    }
}

/// Request body for `PUT /venue/holds/{id}/reserve`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveSeatsRequest {
    /// Customer the hold was made for.
    pub customer_email: String,
}

/// Response body for `PUT /venue/holds/{id}/reserve`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReserveSeatsResponse {
    /// Confirmed hold.
    pub hold_id: HoldId,
    /// Reservation confirmation code.
    pub confirmation_code: String,
}

/// Holds on one venue level for `GET /venue/holds`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LevelHoldDetailDto {
    /// Level index.
    pub level: u32,
    /// Level name.
    pub name: String,
    /// Number of rows.
    pub rows: u32,
    /// Seats per row.
    pub seats_in_row: u32,
    /// Seats not covered by a live hold.
    pub available_seats: usize,
    /// Number of confirmed holds.
    pub confirmed_holds: usize,
    /// Live holds, oldest first.
    pub seat_holds: Vec<SeatHoldDto>,
}

impl From<&LevelHolds> for LevelHoldDetailDto {
    fn from(level: &LevelHolds) -> Self {
        Self {
            level: level.level,
            name: level.seat_level.name.clone(),
            rows: level.seat_level.rows,
            seats_in_row: level.seat_level.seats_in_row,
            available_seats: level.available_seats(),
            confirmed_holds: level.confirmed_holds(),
            seat_holds: level
                .holds
                .iter()
                .map(|hold| SeatHoldDto::from(hold.as_ref()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn hold_request_defaults_level_range() {
        let json = r#"{"num_seats":2,"customer_email":"fan@venue.org"}"#;
        let Ok(req) = serde_json::from_str::<HoldSeatsRequest>(json) else {
            panic!("valid request");
        };
        assert_eq!(req.num_seats, 2);
        assert_eq!(req.min_level, None);
        assert_eq!(req.max_level, None);
    }

    #[test]
    fn seat_hold_serializes_flat_fields() {
        let dto = SeatHoldDto {
            hold_id: HoldId::new(1_000_001),
            level: 2,
            customer_email: "fan@venue.org".into(),
            seat_count: 3,
            confirmed: false,
            created_at: Utc::now(),
        };
        let Ok(value) = serde_json::to_value(&dto) else {
            panic!("serialization failed");
        };
        assert_eq!(value["hold_id"], 1_000_001);
        assert_eq!(value["level"], 2);
        assert_eq!(value["seat_count"], 3);
        assert_eq!(value["confirmed"], false);
    }
}
