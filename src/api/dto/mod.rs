//! Data Transfer Objects for REST request/response serialization.
//!
//! Hold ids are serialized as plain JSON numbers; timestamps as RFC 3339
//! strings.

pub mod common_dto;
pub mod hold_dto;

pub use common_dto::*;
pub use hold_dto::*;
