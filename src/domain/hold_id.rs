//! Type-safe hold identifiers and the shared id counter.
//!
//! [`HoldId`] is a newtype wrapper around `u64` so that hold identifiers
//! cannot be confused with level indices or slot tokens. [`HoldIdCounter`]
//! hands out strictly increasing ids and is meant to be cloned into every
//! [`super::LeaseManager`] of a venue so the id space stays venue-wide.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique identifier for a seat hold.
///
/// Issued once by a [`HoldIdCounter`] when a hold is granted and immutable
/// thereafter. Used as the key of a manager's active-lease map and as the
/// path parameter of the reserve endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct HoldId(u64);

impl HoldId {
    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Lowercase hexadecimal rendering, used as the reservation
    /// confirmation code.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("{:x}", self.0)
    }
}

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for HoldId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<HoldId> for u64 {
    fn from(id: HoldId) -> Self {
        id.0
    }
}

/// Shared monotonic source of [`HoldId`]s.
///
/// Cloning is cheap and yields a handle onto the same counter; this is the
/// only state level managers share with each other.
#[derive(Debug, Clone)]
pub struct HoldIdCounter {
    last: Arc<AtomicU64>,
}

impl HoldIdCounter {
    /// Creates a counter whose first issued id is `seed + 1`.
    #[must_use]
    pub fn starting_after(seed: u64) -> Self {
        Self {
            last: Arc::new(AtomicU64::new(seed)),
        }
    }

    /// Issues the next id. Every id returned is strictly greater than any
    /// previous one from a handle of the same counter.
    ///
    /// Returns `None` once the id space is exhausted; the counter never
    /// wraps.
    pub fn next_id(&self) -> Option<HoldId> {
        self.last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                last.checked_add(1)
            })
            .ok()
            .and_then(|prev| prev.checked_add(1))
            .map(HoldId)
    }

    /// Returns the most recently issued id (or the seed if none was issued).
    #[must_use]
    pub fn last_issued(&self) -> HoldId {
        HoldId(self.last.load(Ordering::Acquire))
    }

    /// Returns `true` if both handles refer to the same counter.
    #[must_use]
    pub fn shares_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.last, &other.last)
    }
}

impl Default for HoldIdCounter {
    fn default() -> Self {
        Self::starting_after(0)
    }
}
