//! Clock and hold-lifetime policy.
//!
//! Lease managers never read the wall clock directly. They ask an
//! [`ExpiryPolicy`] for the current instant when a hold is created and
//! whether a creation instant has outlived the hold TTL. [`TtlPolicy`] is
//! the production implementation; [`FixedPolicy`] gives deterministic
//! "always expired" / "never expired" answers and can be flipped at runtime.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::ConfigError;

/// Default hold lifetime in seconds.
pub const DEFAULT_HOLD_TTL_SECS: u64 = 30;

/// Supplies the current time and decides whether a hold has timed out.
pub trait ExpiryPolicy: fmt::Debug + Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns `true` iff a hold created at `created_at` is past its TTL.
    fn is_expired(&self, created_at: DateTime<Utc>) -> bool;
}

/// Wall-clock policy with a fixed, positive hold lifetime.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    ttl: TimeDelta,
}

impl TtlPolicy {
    /// Creates a policy expiring holds `ttl` after creation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveTtl`] if `ttl` is zero or negative.
    pub fn new(ttl: TimeDelta) -> Result<Self, ConfigError> {
        if ttl <= TimeDelta::zero() {
            return Err(ConfigError::NonPositiveTtl);
        }
        Ok(Self { ttl })
    }

    /// Convenience constructor taking whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveTtl`] if `secs` is zero or does not
    /// fit a [`TimeDelta`].
    pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
        let secs = i64::try_from(secs).map_err(|_| ConfigError::NonPositiveTtl)?;
        let ttl = TimeDelta::try_seconds(secs).ok_or(ConfigError::NonPositiveTtl)?;
        Self::new(ttl)
    }

    /// The configured hold lifetime.
    #[must_use]
    pub const fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// A cutoff before the earliest representable instant expires nothing.
    fn expired_at(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.checked_sub_signed(self.ttl)
            .is_some_and(|cutoff| created_at <= cutoff)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            ttl: TimeDelta::seconds(DEFAULT_HOLD_TTL_SECS as i64),
        }
    }
}

impl ExpiryPolicy for TtlPolicy {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_expired(&self, created_at: DateTime<Utc>) -> bool {
        self.expired_at(created_at, self.now())
    }
}

/// Deterministic policy whose verdict ignores timestamps entirely.
///
/// Used to drive expiration without waiting on real time. The verdict can
/// be switched while managers hold the policy, which makes it possible to
/// confirm a hold first and expire everything afterwards.
#[derive(Debug)]
pub struct FixedPolicy {
    expired: AtomicBool,
}

impl FixedPolicy {
    /// Every hold is considered expired.
    #[must_use]
    pub const fn always_expired() -> Self {
        Self {
            expired: AtomicBool::new(true),
        }
    }

    /// No hold is ever considered expired.
    #[must_use]
    pub const fn never_expired() -> Self {
        Self {
            expired: AtomicBool::new(false),
        }
    }

    /// Flips the verdict returned by [`ExpiryPolicy::is_expired`].
    pub fn set_expired(&self, expired: bool) {
        self.expired.store(expired, Ordering::Release);
    }
}

impl ExpiryPolicy for FixedPolicy {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn is_expired(&self, _created_at: DateTime<Utc>) -> bool {
        self.expired.load(Ordering::Acquire)
    }
}
