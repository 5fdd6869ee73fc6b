//! Concurrent slot-lease manager for a single capacity-bounded pool.
//!
//! [`LeaseManager`] tracks which slot tokens are free and which are held,
//! hands out holds, turns holds into permanent claims, and reclaims the
//! slots of holds that outlived their TTL without being confirmed.
//!
//! # Concurrency
//!
//! There is no manager-wide lock. The free pool, the active-hold map and
//! the expiration index are each independently synchronised:
//!
//! - [`SlotPool`]: short `parking_lot::Mutex` sections, never waits for space.
//! - active holds: [`DashMap`], sharded.
//! - expiration index: `parking_lot::Mutex<BinaryHeap>`, oldest hold first.
//!
//! A hold request only ever works on tokens it has itself taken out of the
//! pool, and puts all of them back if it cannot be satisfied, so no partial
//! hold is ever visible. Expiration is lazy: every public operation that
//! reports state first runs a collection pass.

use std::cmp::{Ordering as CmpOrdering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use super::expiry::ExpiryPolicy;
use super::lease::Lease;
use super::slot_pool::{SlotPool, SlotToken};
use super::{HoldId, HoldIdCounter};
use crate::error::ConfigError;

/// Observer of holds reclaimed by a collection pass.
///
/// Called after the hold has left the active map and its slots are back in
/// circulation. Implementations must not call back into the manager.
pub trait ExpiryListener: fmt::Debug + Send + Sync {
    /// A hold on `pool_id` expired unconfirmed and was reclaimed.
    fn hold_expired(&self, id: HoldId, pool_id: u32);
}

/// Expiration index entry, ordered by [`Lease::expiry_key`].
struct IndexEntry<P>(Arc<Lease<P>>);

impl<P> PartialEq for IndexEntry<P> {
    fn eq(&self, other: &Self) -> bool {
        self.0.expiry_key() == other.0.expiry_key()
    }
}

impl<P> Eq for IndexEntry<P> {}

impl<P> PartialOrd for IndexEntry<P> {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for IndexEntry<P> {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.0.expiry_key().cmp(&other.0.expiry_key())
    }
}

/// Bounded destination for reclaimed tokens during a hold request.
struct Drain<'a> {
    dst: &'a mut Vec<SlotToken>,
    quota: usize,
}

impl Drain<'_> {
    fn is_satisfied(&self) -> bool {
        self.dst.len() >= self.quota
    }

    /// Takes as many of `slots` as the quota allows and returns the rest.
    fn fill<'s>(&mut self, slots: &'s [SlotToken]) -> &'s [SlotToken] {
        let room = self.quota.saturating_sub(self.dst.len()).min(slots.len());
        let (taken, rest) = slots.split_at(room);
        self.dst.extend_from_slice(taken);
        rest
    }
}

/// Builder for [`LeaseManager`].
///
/// The expiry policy is mandatory; [`LeaseManagerBuilder::build`] fails
/// without one.
#[derive(Debug)]
pub struct LeaseManagerBuilder {
    pool_id: u32,
    capacity: u32,
    policy: Option<Arc<dyn ExpiryPolicy>>,
    tag: String,
    ids: Option<HoldIdCounter>,
    listener: Option<Arc<dyn ExpiryListener>>,
}

impl LeaseManagerBuilder {
    /// Sets the expiry policy.
    #[must_use]
    pub fn policy(mut self, policy: Arc<dyn ExpiryPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the diagnostic tag used in logs.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Draws hold ids from a shared counter instead of a private one.
    #[must_use]
    pub fn id_counter(mut self, ids: HoldIdCounter) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Registers an observer of reclaimed holds.
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn ExpiryListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Builds the manager with every token `0..capacity` free.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if capacity is zero and
    /// [`ConfigError::MissingPolicy`] if no expiry policy was set.
    pub fn build<P>(self) -> Result<LeaseManager<P>, ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let policy = self.policy.ok_or(ConfigError::MissingPolicy)?;
        let capacity = self.capacity as usize;

        tracing::debug!(tag = %self.tag, capacity, "lease manager initialized");

        Ok(LeaseManager {
            pool_id: self.pool_id,
            tag: self.tag,
            policy,
            free: SlotPool::full(self.capacity),
            active: DashMap::with_capacity(capacity),
            expiration: Mutex::new(BinaryHeap::with_capacity(capacity)),
            confirmed: AtomicUsize::new(0),
            ids: self.ids.unwrap_or_default(),
            listener: self.listener,
        })
    }
}

/// Manages time-bounded holds on the slots of one pool.
///
/// `P` is caller data stored on every hold (the venue stores the customer
/// email there).
pub struct LeaseManager<P> {
    pool_id: u32,
    tag: String,
    policy: Arc<dyn ExpiryPolicy>,
    free: SlotPool,
    active: DashMap<HoldId, Arc<Lease<P>>>,
    expiration: Mutex<BinaryHeap<Reverse<IndexEntry<P>>>>,
    confirmed: AtomicUsize,
    ids: HoldIdCounter,
    listener: Option<Arc<dyn ExpiryListener>>,
}

impl LeaseManager<()> {
    /// Starts a builder for a pool with the given id and capacity.
    #[must_use]
    pub fn builder(pool_id: u32, capacity: u32) -> LeaseManagerBuilder {
        LeaseManagerBuilder {
            pool_id,
            capacity,
            policy: None,
            tag: format!("pool-{pool_id}"),
            ids: None,
            listener: None,
        }
    }
}

impl<P> LeaseManager<P> {
    /// Creates a manager with a private id counter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(
        pool_id: u32,
        capacity: u32,
        policy: Arc<dyn ExpiryPolicy>,
        tag: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        LeaseManager::builder(pool_id, capacity)
            .policy(policy)
            .tag(tag)
            .build()
    }

    /// Identifier of the managed pool.
    #[must_use]
    pub const fn pool_id(&self) -> u32 {
        self.pool_id
    }

    /// Diagnostic tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Total number of slots, free or held.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.free.capacity()
    }

    /// Number of holds confirmed through this manager.
    #[must_use]
    pub fn confirmed_count(&self) -> usize {
        self.confirmed.load(Ordering::Acquire)
    }

    /// Counter hold ids are drawn from.
    #[must_use]
    pub const fn id_counter(&self) -> &HoldIdCounter {
        &self.ids
    }

    /// Holds `count` slots for `payload`.
    ///
    /// Free slots are taken first. If that is not enough, expired
    /// unconfirmed holds are reclaimed straight into this request. If the
    /// request still cannot be satisfied every claimed slot goes back to the
    /// pool and `None` is returned; no id is consumed in that case.
    pub fn request_hold(&self, count: usize, payload: P) -> Option<Arc<Lease<P>>> {
        if count < 1 {
            tracing::warn!(tag = %self.tag, count, "invalid number of hold slots requested");
            return None;
        }
        if count > self.capacity() {
            tracing::warn!(tag = %self.tag, count, "hold request exceeds capacity");
            return None;
        }

        let mut claimed = Vec::with_capacity(count);
        self.free.drain_into(&mut claimed, count);
        if claimed.len() < count {
            self.collect_expired(Some(Drain {
                dst: &mut claimed,
                quota: count,
            }));
        }

        if claimed.len() < count {
            tracing::warn!(tag = %self.tag, count, "unable to satisfy hold request");
            self.free.release(claimed);
            return None;
        }

        let Some(id) = self.ids.next_id() else {
            tracing::error!(tag = %self.tag, "hold id space exhausted");
            self.free.release(claimed);
            return None;
        };
        let lease = Arc::new(Lease::new(
            id,
            self.pool_id,
            claimed,
            self.policy.now(),
            payload,
        ));
        // Map first: index entries must always refer to mapped holds.
        self.active.insert(lease.id(), Arc::clone(&lease));
        self.expiration
            .lock()
            .push(Reverse(IndexEntry(Arc::clone(&lease))));

        tracing::info!(
            tag = %self.tag,
            hold_id = %lease.id(),
            slots = ?lease.slots(),
            "hold claimed slots"
        );
        Some(lease)
    }

    /// Turns a hold into a permanent claim.
    ///
    /// Returns `false` if the hold does not exist, has expired, or was
    /// reclaimed while being confirmed. Confirming an already confirmed hold
    /// returns `true` without counting it again.
    pub fn confirm_hold(&self, id: HoldId) -> bool {
        let Some(lease) = self.get_reservation(id) else {
            tracing::debug!(tag = %self.tag, hold_id = %id, "hold was not found or has expired");
            return false;
        };

        if !lease.mark_confirmed() {
            // Confirmed holds are never reclaimed.
            return self.active.contains_key(&id);
        }

        // Collection removes a hold under the shard lock only if it still
        // reads unconfirmed, so this check either sees the hold or observes
        // a removal that happened before the flag was set.
        if !self.active.contains_key(&id) {
            tracing::warn!(tag = %self.tag, hold_id = %id, "hold expired while being confirmed");
            return false;
        }

        self.confirmed.fetch_add(1, Ordering::AcqRel);
        tracing::info!(
            tag = %self.tag,
            hold_id = %id,
            slots = lease.slot_count(),
            "hold confirmed"
        );
        true
    }

    /// Number of free slots after reclaiming expired holds.
    pub fn count_available(&self) -> usize {
        self.collect_expired(None);
        self.free.len()
    }

    /// Looks up a live hold.
    pub fn get_reservation(&self, id: HoldId) -> Option<Arc<Lease<P>>> {
        self.collect_expired(None);
        self.active.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns `true` if the hold is still in the active map.
    ///
    /// Unlike [`LeaseManager::get_reservation`] this runs no collection, so
    /// an expired hold that has not been reclaimed yet still counts.
    #[must_use]
    pub fn tracks_hold(&self, id: HoldId) -> bool {
        self.active.contains_key(&id)
    }

    /// All live holds, oldest first.
    pub fn list_all(&self) -> Vec<Arc<Lease<P>>> {
        self.collect_expired(None);
        let mut holds: Vec<_> = self
            .active
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        holds.sort_by_key(|lease| lease.expiry_key());
        holds
    }

    /// Reclaims expired unconfirmed holds, oldest first.
    ///
    /// Slots go to `drain` while it has quota left, otherwise back to the
    /// free pool. Stops at the first hold that has not expired, when the
    /// index is empty, or once `drain` is satisfied.
    fn collect_expired(&self, mut drain: Option<Drain<'_>>) {
        loop {
            if drain.as_ref().is_some_and(Drain::is_satisfied) {
                break;
            }
            let Some(lease) = self.pop_expired() else {
                break;
            };
            if lease.is_confirmed() {
                continue;
            }
            let removed = self
                .active
                .remove_if(&lease.id(), |_, held| !held.is_confirmed());
            if removed.is_none() {
                continue;
            }

            let rest = match drain.as_mut() {
                Some(d) => d.fill(lease.slots()),
                None => lease.slots(),
            };
            if !rest.is_empty() {
                self.free.release(rest.iter().copied());
            }

            tracing::info!(
                tag = %self.tag,
                hold_id = %lease.id(),
                created_at = %lease.created_at(),
                slots = lease.slot_count(),
                "hold expired"
            );
            if let Some(listener) = &self.listener {
                listener.hold_expired(lease.id(), self.pool_id);
            }
        }
    }

    /// Pops the oldest index entry if it has expired.
    fn pop_expired(&self) -> Option<Arc<Lease<P>>> {
        let mut index = self.expiration.lock();
        let Reverse(IndexEntry(oldest)) = index.peek()?;
        if !self.policy.is_expired(oldest.created_at()) {
            return None;
        }
        index.pop().map(|Reverse(IndexEntry(lease))| lease)
    }
}

impl<P> fmt::Debug for LeaseManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseManager")
            .field("pool_id", &self.pool_id)
            .field("tag", &self.tag)
            .field("capacity", &self.capacity())
            .field("policy", &self.policy)
            .field("holds", &self.active.len())
            .field("confirmed", &self.confirmed_count())
            .field("available", &self.free.len())
            .finish_non_exhaustive()
    }
}

impl<P> fmt::Display for LeaseManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LeaseManager[id={}, tag={}, holds={}, confirmed={}, available={}]",
            self.pool_id,
            self.tag,
            self.active.len(),
            self.confirmed_count(),
            self.free.len()
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::domain::FixedPolicy;

    fn manager_with(capacity: u32, policy: Arc<FixedPolicy>) -> LeaseManager<String> {
        let Ok(manager) = LeaseManager::new(0, capacity, policy, "test-level") else {
            panic!("valid manager");
        };
        manager
    }

    fn never(capacity: u32) -> LeaseManager<String> {
        manager_with(capacity, Arc::new(FixedPolicy::never_expired()))
    }

    fn always(capacity: u32) -> LeaseManager<String> {
        manager_with(capacity, Arc::new(FixedPolicy::always_expired()))
    }

    fn hold(manager: &LeaseManager<String>, count: usize) -> Option<Arc<Lease<String>>> {
        manager.request_hold(count, "fan@venue.org".to_string())
    }

    /// Every token is either free or held by exactly one live hold.
    fn assert_conserved<P>(manager: &LeaseManager<P>) {
        let mut seen: HashSet<SlotToken> = manager.free.snapshot().into_iter().collect();
        let mut total = seen.len();
        for entry in &manager.active {
            for slot in entry.value().slots() {
                total += 1;
                assert!(seen.insert(*slot), "token {slot} appears twice");
            }
        }
        assert_eq!(total, manager.capacity());
        assert!(seen.iter().all(|t| (t.get() as usize) < manager.capacity()));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let result: Result<LeaseManager<()>, _> =
            LeaseManager::new(0, 0, Arc::new(FixedPolicy::never_expired()), "empty");
        assert_eq!(result.err(), Some(ConfigError::ZeroCapacity));
    }

    #[test]
    fn missing_policy_is_rejected() {
        let result = LeaseManager::builder(1, 10).tag("no-policy").build::<()>();
        assert_eq!(result.err(), Some(ConfigError::MissingPolicy));
    }

    #[test]
    fn new_manager_has_every_slot_free() {
        let manager = never(7);
        assert_eq!(manager.capacity(), 7);
        assert_eq!(manager.count_available(), 7);
        assert!(manager.list_all().is_empty());
        assert_eq!(manager.tag(), "test-level");
        assert_conserved(&manager);
    }

    #[test]
    fn pool_size_never_grows_with_invalid_requests() {
        let managers = [never(1), never(2), never(3)];
        let pattern = [0usize, 1, 0, 1, 2, 0, 2];

        for count in pattern {
            for manager in &managers {
                let should_fail =
                    count == 0 || count > manager.capacity() || count > manager.free.len();
                let result = hold(manager, count);
                assert_eq!(result.is_none(), should_fail, "count {count} on {manager}");
                assert!(manager.free.len() <= manager.capacity());
                assert_conserved(manager);
            }
        }
    }

    #[test]
    fn all_hold_requests_are_satisfied() {
        let pattern = [1usize, 2, 1, 7, 3, 5, 4, 6];
        let capacity: usize = pattern.iter().sum();
        let manager = never(capacity as u32);

        let mut held = HashSet::new();
        for count in pattern {
            let Some(lease) = hold(&manager, count) else {
                panic!("request for {count} slots failed");
            };
            assert_eq!(lease.slot_count(), count);
            for slot in lease.slots() {
                assert!(held.insert(*slot), "slot {slot} handed out twice");
            }
        }
        assert_eq!(manager.count_available(), 0);
        assert!(hold(&manager, 1).is_none());
        assert_conserved(&manager);
    }

    #[test]
    fn exhausted_pool_rejects_further_requests() {
        let manager = never(5);
        assert!(hold(&manager, 2).is_some());
        assert!(hold(&manager, 3).is_some());
        assert!(hold(&manager, 1).is_none());
        assert_eq!(manager.count_available(), 0);
        assert_eq!(manager.list_all().len(), 2);
    }

    #[test]
    fn expired_holds_are_collected() {
        let manager = always(5);
        for count in [1, 1, 1, 2] {
            assert!(hold(&manager, count).is_some());
        }
        assert_eq!(manager.active.len(), 4);
        assert_eq!(manager.free.len(), 0);

        assert_eq!(manager.count_available(), 5);
        assert!(manager.active.is_empty());
        assert!(manager.expiration.lock().is_empty());
        assert_conserved(&manager);
    }

    #[test]
    fn confirmed_hold_survives_expiration() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = manager_with(5, Arc::clone(&policy));

        let Some(lease) = hold(&manager, 1) else {
            panic!("hold failed");
        };
        assert!(manager.confirm_hold(lease.id()));
        assert_eq!(manager.count_available(), 4);

        policy.set_expired(true);
        assert_eq!(manager.count_available(), 4);
        assert_eq!(manager.count_available(), 4);

        let Some(found) = manager.get_reservation(lease.id()) else {
            panic!("confirmed hold disappeared");
        };
        assert!(found.is_confirmed());
        assert!(manager.expiration.lock().is_empty());
        assert_conserved(&manager);
    }

    #[test]
    fn failed_request_has_no_side_effects() {
        let manager = never(5);
        assert!(hold(&manager, 5).is_some());
        let last_id = manager.id_counter().last_issued();

        assert!(hold(&manager, 1).is_none());
        assert_eq!(manager.count_available(), 0);
        assert_eq!(manager.list_all().len(), 1);
        assert_eq!(manager.id_counter().last_issued(), last_id);
        assert_conserved(&manager);
    }

    #[test]
    fn shortfall_rolls_back_claimed_slots() {
        let manager = never(5);
        assert!(hold(&manager, 3).is_some());
        let last_id = manager.id_counter().last_issued();

        assert!(hold(&manager, 3).is_none());
        assert_eq!(manager.free.len(), 2);
        assert_eq!(manager.active.len(), 1);
        assert_eq!(manager.id_counter().last_issued(), last_id);
        assert_conserved(&manager);
    }

    #[test]
    fn confirm_unknown_hold_returns_false() {
        let manager = never(5);
        assert!(!manager.confirm_hold(HoldId::new(424_242)));
        assert_eq!(manager.confirmed_count(), 0);
    }

    #[test]
    fn confirm_is_idempotent() {
        let manager = never(5);
        let Some(lease) = hold(&manager, 2) else {
            panic!("hold failed");
        };
        assert!(manager.confirm_hold(lease.id()));
        assert!(manager.confirm_hold(lease.id()));
        assert_eq!(manager.confirmed_count(), 1);
    }

    #[test]
    fn expired_hold_cannot_be_confirmed() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = manager_with(3, Arc::clone(&policy));
        let Some(lease) = hold(&manager, 2) else {
            panic!("hold failed");
        };

        policy.set_expired(true);
        assert!(manager.get_reservation(lease.id()).is_none());
        assert!(!manager.confirm_hold(lease.id()));
        assert_eq!(manager.confirmed_count(), 0);
        assert_eq!(manager.count_available(), 3);
    }

    #[test]
    fn request_reclaims_expired_slots_for_itself() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = manager_with(4, Arc::clone(&policy));

        let Some(stale) = hold(&manager, 3) else {
            panic!("hold failed");
        };
        let Some(kept) = hold(&manager, 1) else {
            panic!("hold failed");
        };
        assert!(manager.confirm_hold(kept.id()));

        policy.set_expired(true);
        let Some(fresh) = hold(&manager, 3) else {
            panic!("request should reclaim the expired hold");
        };
        let mut reclaimed = fresh.slots().to_vec();
        let mut original = stale.slots().to_vec();
        reclaimed.sort();
        original.sort();
        assert_eq!(reclaimed, original);

        policy.set_expired(false);
        assert!(manager.get_reservation(stale.id()).is_none());
        assert!(manager.get_reservation(kept.id()).is_some());
        assert!(manager.get_reservation(fresh.id()).is_some());
        assert_conserved(&manager);
    }

    #[test]
    fn reclaim_stops_once_request_is_satisfied() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = manager_with(5, Arc::clone(&policy));

        let Some(big) = hold(&manager, 4) else {
            panic!("hold failed");
        };
        let Some(small) = hold(&manager, 1) else {
            panic!("hold failed");
        };

        policy.set_expired(true);
        let Some(fresh) = hold(&manager, 2) else {
            panic!("request should reclaim");
        };
        assert_eq!(fresh.slot_count(), 2);
        // The oldest hold covered the request; its surplus went back to the
        // pool and the younger hold was left for a later pass.
        assert_eq!(manager.free.len(), 2);
        assert!(manager.active.contains_key(&small.id()));
        assert!(!manager.active.contains_key(&big.id()));
        assert_conserved(&manager);

        policy.set_expired(false);
        assert_eq!(manager.count_available(), 2);
        policy.set_expired(true);
        assert_eq!(manager.count_available(), 5);
        assert_conserved(&manager);
    }

    #[test]
    fn list_all_is_oldest_first_and_skips_expired() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = manager_with(6, Arc::clone(&policy));
        let ids: Vec<HoldId> = (0..3)
            .filter_map(|_| hold(&manager, 1).map(|l| l.id()))
            .collect();
        let listed: Vec<HoldId> = manager.list_all().iter().map(|l| l.id()).collect();
        assert_eq!(listed, ids);

        if let Some(first) = ids.first() {
            assert!(manager.confirm_hold(*first));
        }
        policy.set_expired(true);
        let listed: Vec<HoldId> = manager.list_all().iter().map(|l| l.id()).collect();
        assert_eq!(listed, ids.iter().take(1).copied().collect::<Vec<_>>());
    }

    #[test]
    fn ids_increase_across_managers_sharing_a_counter() {
        let ids = HoldIdCounter::starting_after(1_000);
        let policy: Arc<dyn ExpiryPolicy> = Arc::new(FixedPolicy::never_expired());
        let build = |pool_id| {
            LeaseManager::builder(pool_id, 4)
                .policy(Arc::clone(&policy))
                .id_counter(ids.clone())
                .build::<String>()
        };
        let (Ok(lower), Ok(upper)) = (build(0), build(1)) else {
            panic!("valid managers");
        };

        let mut last = HoldId::new(1_000);
        for manager in [&lower, &upper, &lower, &upper] {
            let Some(lease) = hold(manager, 1) else {
                panic!("hold failed");
            };
            assert!(lease.id() > last);
            last = lease.id();
        }
        assert!(lower.id_counter().shares_with(upper.id_counter()));
    }

    #[derive(Debug, Default)]
    struct Recorder(parking_lot::Mutex<Vec<(HoldId, u32)>>);

    impl ExpiryListener for Recorder {
        fn hold_expired(&self, id: HoldId, pool_id: u32) {
            self.0.lock().push((id, pool_id));
        }
    }

    #[test]
    fn listener_sees_only_reclaimed_holds() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let recorder = Arc::new(Recorder::default());
        let Ok(manager) = LeaseManager::builder(3, 4)
            .policy(Arc::clone(&policy) as Arc<dyn ExpiryPolicy>)
            .listener(Arc::clone(&recorder) as Arc<dyn ExpiryListener>)
            .build::<String>()
        else {
            panic!("valid manager");
        };

        let (Some(kept), Some(dropped)) = (hold(&manager, 1), hold(&manager, 2)) else {
            panic!("hold failed");
        };
        assert!(manager.confirm_hold(kept.id()));
        assert!(recorder.0.lock().is_empty());

        policy.set_expired(true);
        assert_eq!(manager.count_available(), 3);
        assert_eq!(*recorder.0.lock(), vec![(dropped.id(), 3)]);
        assert!(manager.tracks_hold(kept.id()));
        assert!(!manager.tracks_hold(dropped.id()));

        assert_eq!(manager.count_available(), 3);
        assert_eq!(recorder.0.lock().len(), 1);
    }

    #[test]
    fn exhausted_id_space_returns_slots() {
        let Ok(manager) = LeaseManager::builder(0, 4)
            .policy(Arc::new(FixedPolicy::never_expired()))
            .id_counter(HoldIdCounter::starting_after(u64::MAX - 1))
            .build::<String>()
        else {
            panic!("valid manager");
        };

        let Some(last) = hold(&manager, 1) else {
            panic!("one id left");
        };
        assert_eq!(last.id().get(), u64::MAX);
        assert!(hold(&manager, 2).is_none());
        assert_eq!(manager.count_available(), 3);
        assert_conserved(&manager);
    }

    #[test]
    fn payload_is_stored_and_replaceable() {
        let manager = never(2);
        let Some(lease) = manager.request_hold(1, "first@venue.org".to_string()) else {
            panic!("hold failed");
        };
        lease.set_payload("second@venue.org".to_string());
        let Some(found) = manager.get_reservation(lease.id()) else {
            panic!("hold missing");
        };
        assert_eq!(found.payload(), "second@venue.org");
    }

    #[test]
    fn concurrent_requests_never_overallocate() {
        let policy = Arc::new(FixedPolicy::never_expired());
        let manager = Arc::new(manager_with(64, Arc::clone(&policy)));

        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let manager = Arc::clone(&manager);
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    for round in 0..400usize {
                        let count = 1 + (worker + round) % 5;
                        if let Some(lease) = manager.request_hold(count, format!("w{worker}"))
                            && round % 3 == 0
                        {
                            manager.confirm_hold(lease.id());
                        }
                        if worker == 0 && round % 50 == 0 {
                            policy.set_expired(round % 100 == 0);
                        }
                        let _ = manager.count_available();
                    }
                })
            })
            .collect();
        for worker in workers {
            assert!(worker.join().is_ok());
        }

        assert_conserved(&manager);
        let confirmed = manager
            .list_all()
            .iter()
            .filter(|l| l.is_confirmed())
            .count();
        assert_eq!(confirmed, manager.confirmed_count());
    }

    #[test]
    fn confirm_racing_expiration_is_all_or_nothing() {
        for _ in 0..200 {
            let policy = Arc::new(FixedPolicy::never_expired());
            let manager = Arc::new(manager_with(4, Arc::clone(&policy)));
            let Some(lease) = hold(&manager, 2) else {
                panic!("hold failed");
            };
            let id = lease.id();
            policy.set_expired(true);

            let collector = {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.count_available())
            };
            let confirmed = manager.confirm_hold(id);
            assert!(collector.join().is_ok());

            let found = manager.get_reservation(id);
            if confirmed {
                let Some(found) = found else {
                    panic!("confirmed hold {id} is not reachable");
                };
                assert!(found.is_confirmed());
                assert_eq!(manager.confirmed_count(), 1);
                assert_eq!(manager.count_available(), 2);
            } else {
                assert!(found.is_none());
                assert_eq!(manager.confirmed_count(), 0);
                assert_eq!(manager.count_available(), 4);
            }
            assert_conserved(&manager);
        }
    }
}
