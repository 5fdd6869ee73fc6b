//! Hold service: finds, holds and reserves seats across venue levels.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::domain::{HoldId, Lease, SeatLevel, Venue};
use crate::error::GatewayError;

/// Live holds of one seating level.
#[derive(Debug, Clone)]
pub struct LevelHolds {
    /// Level index.
    pub level: u32,
    /// Level layout.
    pub seat_level: SeatLevel,
    /// Holds that have not expired, oldest first.
    pub holds: Vec<Arc<Lease<String>>>,
}

impl LevelHolds {
    /// Seats not covered by any listed hold.
    #[must_use]
    pub fn available_seats(&self) -> usize {
        let held: usize = self.holds.iter().map(|h| h.slot_count()).sum();
        (self.seat_level.capacity() as usize).saturating_sub(held)
    }

    /// Number of listed holds that are confirmed.
    #[must_use]
    pub fn confirmed_holds(&self) -> usize {
        self.holds.iter().filter(|h| h.is_confirmed()).count()
    }
}

/// Orchestration layer for all seat-hold operations.
///
/// Stateless coordinator over a shared [`Venue`]. Each method validates its
/// input, resolves the level(s) involved and calls into the level managers,
/// which run their own expiration passes.
#[derive(Debug, Clone)]
pub struct HoldService {
    venue: Arc<Venue>,
}

impl HoldService {
    /// Creates a new `HoldService`.
    #[must_use]
    pub fn new(venue: Arc<Venue>) -> Self {
        Self { venue }
    }

    /// Returns a reference to the inner [`Venue`].
    #[must_use]
    pub fn venue(&self) -> &Arc<Venue> {
        &self.venue
    }

    /// Number of seats neither held nor reserved, on one level or on all.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LevelNotFound`] for an unknown level.
    pub fn num_seats_available(&self, level: Option<u32>) -> Result<usize, GatewayError> {
        let mut available = 0;
        for index in self.levels(level)? {
            if let Some(manager) = self.venue.manager(index) {
                available += manager.count_available();
            }
        }
        Ok(available)
    }

    /// Live holds per level, on one level or on all.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::LevelNotFound`] for an unknown level.
    pub fn hold_details(&self, level: Option<u32>) -> Result<Vec<LevelHolds>, GatewayError> {
        let mut details = Vec::new();
        for index in self.levels(level)? {
            let (Some(manager), Some(seat_level)) =
                (self.venue.manager(index), self.venue.level(index))
            else {
                continue;
            };
            details.push(LevelHolds {
                level: index,
                seat_level: seat_level.clone(),
                holds: manager.list_all(),
            });
        }
        Ok(details)
    }

    /// Holds `num_seats` seats on the highest level in
    /// `[min_level, max_level]` that can seat them all.
    ///
    /// Returns `Ok(None)` when zero seats are requested.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for a negative seat count,
    /// an invalid level range or an invalid email, and
    /// [`GatewayError::NoSeatsAvailable`] when no level in range has room.
    pub fn find_and_hold_seats(
        &self,
        num_seats: i64,
        min_level: Option<i64>,
        max_level: Option<i64>,
        customer_email: &str,
    ) -> Result<Option<Arc<Lease<String>>>, GatewayError> {
        if num_seats == 0 {
            return Ok(None);
        }
        let count = usize::try_from(num_seats).map_err(|_| {
            GatewayError::InvalidRequest(format!(
                "invalid number of seats [{num_seats}] being requested"
            ))
        })?;

        let range = self.level_range(min_level, max_level)?;
        validate_customer_email(customer_email)?;

        for index in range.rev() {
            let Some(manager) = self.venue.manager(index) else {
                continue;
            };
            if let Some(hold) = manager.request_hold(count, customer_email.to_string()) {
                self.venue.record_hold(hold.id(), index);
                tracing::info!(
                    hold_id = %hold.id(),
                    level = index,
                    seats = count,
                    "seats held"
                );
                return Ok(Some(hold));
            }
        }

        Err(GatewayError::NoSeatsAvailable)
    }

    /// Confirms a hold for the customer it was made for and returns the
    /// reservation confirmation code.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for an invalid email, a hold
    /// id the venue never issued, or a hold owned by another customer, and
    /// [`GatewayError::HoldNotFound`] if the hold expired or could not be
    /// confirmed.
    pub fn reserve_seats(
        &self,
        hold_id: HoldId,
        customer_email: &str,
    ) -> Result<String, GatewayError> {
        validate_customer_email(customer_email)?;

        let not_found = || GatewayError::HoldNotFound {
            hold_id,
            customer_email: customer_email.to_string(),
        };

        let Some(level) = self.venue.level_of(hold_id) else {
            if self.venue.was_issued(hold_id) {
                return Err(not_found());
            }
            return Err(GatewayError::InvalidRequest(format!(
                "seat hold {hold_id} does not exist in the venue"
            )));
        };
        let manager = self
            .venue
            .manager(level)
            .ok_or_else(|| GatewayError::Internal(format!("hold {hold_id} maps to level {level}")))?;

        let Some(hold) = manager.get_reservation(hold_id) else {
            self.venue.forget_hold(hold_id);
            return Err(not_found());
        };

        if !hold.with_payload(|owner| owner == customer_email) {
            return Err(GatewayError::InvalidRequest(format!(
                "seat hold {hold_id} is not associated with customer email {customer_email}"
            )));
        }

        if !manager.confirm_hold(hold_id) {
            self.venue.forget_hold(hold_id);
            return Err(not_found());
        }

        tracing::info!(%hold_id, level, "seats reserved");
        Ok(hold_id.to_hex())
    }

    /// Level indices covered by an optional single-level filter.
    fn levels(&self, level: Option<u32>) -> Result<RangeInclusive<u32>, GatewayError> {
        let last = self.venue.level_count().saturating_sub(1);
        match level {
            None => Ok(0..=last),
            Some(index) if index <= last => Ok(index..=index),
            Some(index) => Err(GatewayError::LevelNotFound(index)),
        }
    }

    /// Validated hold search range; defaults to every level.
    fn level_range(
        &self,
        min_level: Option<i64>,
        max_level: Option<i64>,
    ) -> Result<RangeInclusive<u32>, GatewayError> {
        let last = i64::from(self.venue.level_count()) - 1;
        let lo = min_level.unwrap_or(0);
        let hi = max_level.unwrap_or(last);

        if lo > hi || lo < 0 || hi > last {
            return Err(GatewayError::InvalidRequest(format!(
                "seat hold level constraints are not valid [{lo}, {hi}]"
            )));
        }
        let to_level = |v: i64| {
            u32::try_from(v)
                .map_err(|_| GatewayError::InvalidRequest(format!("invalid level {v}")))
        };
        Ok(to_level(lo)?..=to_level(hi)?)
    }
}

/// Checks that `email` looks like a deliverable address: one `@`, a
/// non-empty local part and a dotted domain without empty labels.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] otherwise.
pub fn validate_customer_email(email: &str) -> Result<(), GatewayError> {
    if email.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "customer email cannot be empty".to_string(),
        ));
    }

    let invalid = || GatewayError::InvalidRequest(format!("{email} is not a valid email address"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }
    if domain.split('.').any(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}
