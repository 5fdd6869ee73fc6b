//! Domain layer: slot leasing core and venue composition.
//!
//! Leaf types first: hold identity, the expiry policy, the bounded slot
//! pool and the lease itself. [`LeaseManager`] ties them into the
//! capacity-bounded hold state machine for one pool; [`Venue`] composes one
//! manager per seating level.

pub mod expiry;
pub mod hold_id;
pub mod lease;
pub mod lease_manager;
pub mod slot_pool;
pub mod venue;
pub mod venue_layout;

pub use expiry::{ExpiryPolicy, FixedPolicy, TtlPolicy};
pub use hold_id::{HoldId, HoldIdCounter};
pub use lease::Lease;
pub use lease_manager::{ExpiryListener, LeaseManager, LeaseManagerBuilder};
pub use slot_pool::{SlotPool, SlotToken};
pub use venue::Venue;
pub use venue_layout::{MAX_LEVEL_SEATS, SeatLevel, VenueLayout};
