//! Service layer: business logic orchestration.
//!
//! [`HoldService`] validates customer requests, chooses which seating level
//! serves a hold, and delegates slot accounting to the level's
//! [`crate::domain::LeaseManager`].

pub mod hold_service;

pub use hold_service::{HoldService, LevelHolds};
