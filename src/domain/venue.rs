//! A venue: one lease manager per seating level over a shared id space.

use std::sync::Arc;

use dashmap::DashMap;

use super::expiry::{ExpiryPolicy, TtlPolicy};
use super::lease_manager::ExpiryListener;
use super::venue_layout::{SeatLevel, VenueLayout};
use super::{HoldId, HoldIdCounter, LeaseManager};
use crate::error::ConfigError;

/// Hold id → level index of every hold a level still tracks.
///
/// Entries leave when their level reclaims the hold.
#[derive(Debug, Default)]
struct HoldLevels(DashMap<HoldId, u32>);

impl ExpiryListener for HoldLevels {
    fn hold_expired(&self, id: HoldId, pool_id: u32) {
        self.0.remove_if(&id, |_, level| *level == pool_id);
    }
}

/// All seating levels of a venue.
///
/// Each level is an independent [`LeaseManager`] keyed by its index; the
/// managers share one [`HoldIdCounter`] so hold ids are unique across the
/// venue. The hold payload is the customer email.
#[derive(Debug)]
pub struct Venue {
    layout: VenueLayout,
    levels: Vec<LeaseManager<String>>,
    hold_levels: Arc<HoldLevels>,
    ids: HoldIdCounter,
    seed: HoldId,
}

impl Venue {
    /// Builds a venue whose holds expire after the layout's TTL.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the layout is invalid.
    pub fn new(layout: VenueLayout, ids: HoldIdCounter) -> Result<Self, ConfigError> {
        layout.validate()?;
        let policy = Arc::new(TtlPolicy::from_secs(layout.holds_expire_after_secs)?);
        Self::with_policy(layout, policy, ids)
    }

    /// Builds a venue with an explicit expiry policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the layout is invalid.
    pub fn with_policy(
        layout: VenueLayout,
        policy: Arc<dyn ExpiryPolicy>,
        ids: HoldIdCounter,
    ) -> Result<Self, ConfigError> {
        layout.validate()?;
        let hold_levels = Arc::new(HoldLevels::default());
        let listener: Arc<dyn ExpiryListener> = Arc::clone(&hold_levels) as _;
        let levels: Vec<LeaseManager<String>> = (0u32..)
            .zip(&layout.seat_levels)
            .map(|(index, level)| {
                LeaseManager::builder(index, level.capacity())
                    .policy(Arc::clone(&policy))
                    .tag(level.name.clone())
                    .id_counter(ids.clone())
                    .listener(Arc::clone(&listener))
                    .build()
            })
            .collect::<Result<_, _>>()?;

        tracing::info!(
            levels = levels.len(),
            seats = levels.iter().map(LeaseManager::capacity).sum::<usize>(),
            "venue initialized"
        );

        Ok(Self {
            layout,
            levels,
            hold_levels,
            seed: ids.last_issued(),
            ids,
        })
    }

    /// The layout the venue was built from.
    #[must_use]
    pub const fn layout(&self) -> &VenueLayout {
        &self.layout
    }

    /// Number of seating levels.
    #[must_use]
    pub fn level_count(&self) -> u32 {
        // `VenueLayout::validate` bounds the level count to u32.
        u32::try_from(self.levels.len()).unwrap_or(u32::MAX)
    }

    /// Layout of one level.
    #[must_use]
    pub fn level(&self, index: u32) -> Option<&SeatLevel> {
        self.layout.seat_levels.get(index as usize)
    }

    /// Lease manager of one level.
    #[must_use]
    pub fn manager(&self, index: u32) -> Option<&LeaseManager<String>> {
        self.levels.get(index as usize)
    }

    /// Level a hold was granted on.
    #[must_use]
    pub fn level_of(&self, hold_id: HoldId) -> Option<u32> {
        self.hold_levels.0.get(&hold_id).map(|entry| *entry.value())
    }

    /// Returns `true` if the venue's counter has issued `hold_id`.
    ///
    /// Ids are drawn only for granted holds, so this also tells a hold that
    /// was reclaimed apart from one that never existed.
    #[must_use]
    pub fn was_issued(&self, hold_id: HoldId) -> bool {
        self.seed < hold_id && hold_id <= self.ids.last_issued()
    }

    /// Remembers which level granted a hold.
    ///
    /// Nothing is kept for a hold the level no longer tracks, which covers a
    /// hold reclaimed before it was recorded.
    pub fn record_hold(&self, hold_id: HoldId, level: u32) {
        self.hold_levels.0.insert(hold_id, level);
        let tracked = self
            .manager(level)
            .is_some_and(|manager| manager.tracks_hold(hold_id));
        if !tracked {
            self.forget_hold(hold_id);
        }
    }

    /// Drops the level mapping of a hold that no longer exists.
    pub fn forget_hold(&self, hold_id: HoldId) {
        self.hold_levels.0.remove(&hold_id);
    }

    /// Number of holds with a recorded level.
    #[must_use]
    pub fn recorded_holds(&self) -> usize {
        self.hold_levels.0.len()
    }
}
