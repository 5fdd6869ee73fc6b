//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Optional single-level filter for read endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LevelQuery {
    /// Restrict the result to this venue level. All levels when absent.
    #[serde(default)]
    pub level: Option<u32>,
}

/// Response body for `GET /venue/seats/available`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeatsAvailableResponse {
    /// Level the count refers to, or `null` for the whole venue.
    pub level: Option<u32>,
    /// Seats neither held nor reserved.
    pub available: usize,
}
