//! # venue-gateway
//!
//! REST gateway for time-bounded venue seat holds.
//!
//! Each seating level is a pool of interchangeable seats managed by a
//! [`domain::LeaseManager`]: customers hold seats for a limited time and
//! may confirm a hold into a permanent reservation. Unconfirmed holds are
//! reclaimed lazily, on the next operation that touches their level.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── HoldService (service/)
//!     │
//!     ├── Venue (domain/)
//!     └── LeaseManager per level (domain/)
//!           ├── SlotPool       free seats
//!           ├── active holds   DashMap
//!           └── expiry index   oldest first
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
