//! A time-bounded claim on a set of slot tokens.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{HoldId, SlotToken};

/// A hold on one or more slots of a single pool.
///
/// Everything except the confirmation flag and the payload is fixed at
/// creation. Confirmation is one-way. The payload sits behind its own lock
/// so it can be read and replaced while the manager works on the lease.
///
/// Once inserted into a [`super::LeaseManager`] the lease is owned by that
/// manager; callers get `Arc<Lease<P>>` read handles.
pub struct Lease<P> {
    id: HoldId,
    pool_id: u32,
    slots: Box<[SlotToken]>,
    created_at: DateTime<Utc>,
    confirmed: AtomicBool,
    payload: RwLock<P>,
}

impl<P> Lease<P> {
    pub(crate) fn new(
        id: HoldId,
        pool_id: u32,
        slots: Vec<SlotToken>,
        created_at: DateTime<Utc>,
        payload: P,
    ) -> Self {
        Self {
            id,
            pool_id,
            slots: slots.into_boxed_slice(),
            created_at,
            confirmed: AtomicBool::new(false),
            payload: RwLock::new(payload),
        }
    }

    /// Hold identifier.
    #[must_use]
    pub const fn id(&self) -> HoldId {
        self.id
    }

    /// Identifier of the pool the slots belong to.
    #[must_use]
    pub const fn pool_id(&self) -> u32 {
        self.pool_id
    }

    /// The held slot tokens.
    #[must_use]
    pub fn slots(&self) -> &[SlotToken] {
        &self.slots
    }

    /// Number of held slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// When the hold was granted.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the hold has been turned into a permanent claim.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.load(Ordering::Acquire)
    }

    /// Sets the confirmed flag. Returns `true` only for the call that
    /// performed the false→true transition.
    pub(crate) fn mark_confirmed(&self) -> bool {
        self.confirmed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Position in the expiration index: oldest first, ties by id.
    #[must_use]
    pub const fn expiry_key(&self) -> (DateTime<Utc>, HoldId) {
        (self.created_at, self.id)
    }

    /// Replaces the payload.
    pub fn set_payload(&self, payload: P) {
        *self.payload.write() = payload;
    }

    /// Runs `f` with shared access to the payload.
    pub fn with_payload<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        let guard = self.payload.read();
        f(&*guard)
    }
}

impl<P: Clone> Lease<P> {
    /// Returns a copy of the payload.
    #[must_use]
    pub fn payload(&self) -> P {
        self.payload.read().clone()
    }
}

impl<P> fmt::Debug for Lease<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("id", &self.id)
            .field("pool_id", &self.pool_id)
            .field("slots", &self.slots)
            .field("created_at", &self.created_at)
            .field("confirmed", &self.is_confirmed())
            .finish_non_exhaustive()
    }
}

impl<P> fmt::Display for Lease<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lease[id={}, created_at={}, confirmed={}, slots={{",
            self.id,
            self.created_at.to_rfc3339(),
            self.is_confirmed()
        )?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{slot}")?;
        }
        f.write_str("}]")
    }
}
