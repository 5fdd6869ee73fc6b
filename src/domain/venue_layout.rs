//! Static seating layout of a venue.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::expiry::DEFAULT_HOLD_TTL_SECS;
use crate::error::ConfigError;

/// Largest number of seats a single level may have.
pub const MAX_LEVEL_SEATS: u32 = 1_000_000;

/// One seating level. Its seats form one pool of interchangeable slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeatLevel {
    /// Display name, also used as the pool's log tag.
    pub name: String,
    /// Price of one seat in cents.
    #[serde(default)]
    pub price_cents: u64,
    /// Number of rows.
    pub rows: u32,
    /// Seats in every row.
    pub seats_in_row: u32,
}

impl SeatLevel {
    /// Total seats on the level.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.rows.saturating_mul(self.seats_in_row)
    }
}

/// Seating levels plus the hold lifetime shared by all of them.
///
/// Level `0` is the lowest level; hold searches start from the highest
/// index in the requested range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VenueLayout {
    /// Levels, indexed by position.
    pub seat_levels: Vec<SeatLevel>,
    /// Seconds an unconfirmed hold stays valid.
    #[serde(default = "default_hold_ttl")]
    pub holds_expire_after_secs: u64,
}

fn default_hold_ttl() -> u64 {
    DEFAULT_HOLD_TTL_SECS
}

impl VenueLayout {
    /// Checks that the layout can back a venue.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyVenue`] for a layout without levels,
    /// [`ConfigError::InvalidLevel`] for a level without rows or seats or
    /// with more than [`MAX_LEVEL_SEATS`] seats, and
    /// [`ConfigError::NonPositiveTtl`] for a zero hold lifetime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seat_levels.is_empty() {
            return Err(ConfigError::EmptyVenue);
        }
        if u32::try_from(self.seat_levels.len()).is_err() {
            return Err(ConfigError::InvalidLayout("too many seat levels".to_string()));
        }
        for (index, level) in (0u32..).zip(&self.seat_levels) {
            if level.rows < 1 {
                return Err(ConfigError::InvalidLevel {
                    level: index,
                    reason: format!("invalid number of rows ({})", level.rows),
                });
            }
            if level.seats_in_row < 1 {
                return Err(ConfigError::InvalidLevel {
                    level: index,
                    reason: format!("invalid number of seats per row ({})", level.seats_in_row),
                });
            }
            let seats = u64::from(level.rows) * u64::from(level.seats_in_row);
            if seats > u64::from(MAX_LEVEL_SEATS) {
                return Err(ConfigError::InvalidLevel {
                    level: index,
                    reason: format!("{seats} seats exceed the limit of {MAX_LEVEL_SEATS}"),
                });
            }
        }
        if self.holds_expire_after_secs == 0 {
            return Err(ConfigError::NonPositiveTtl);
        }
        Ok(())
    }

    /// Parses a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLayout`] if the document does not
    /// describe a layout.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::InvalidLayout(e.to_string()))
    }
}

impl Default for VenueLayout {
    fn default() -> Self {
        let level = |name: &str, price_cents, rows, seats_in_row| SeatLevel {
            name: name.to_string(),
            price_cents,
            rows,
            seats_in_row,
        };
        Self {
            seat_levels: vec![
                level("Orchestra", 10_000, 25, 50),
                level("Main", 7_500, 20, 100),
                level("Balcony 1", 5_000, 15, 100),
                level("Balcony 2", 4_000, 15, 100),
            ],
            holds_expire_after_secs: DEFAULT_HOLD_TTL_SECS,
        }
    }
}
