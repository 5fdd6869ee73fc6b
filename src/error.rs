//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for request handling. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. [`ConfigError`] covers construction-time failures of the lease
//! managers and the venue; those abort startup and never reach a client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::HoldId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "venue level 7 was not found",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Capacity        | 422 Unprocessable Entity   |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Venue level index is out of range.
    #[error("venue level {0} was not found")]
    LevelNotFound(u32),

    /// Hold does not exist, has expired, or could not be confirmed.
    #[error("reservation {hold_id} for {customer_email} was not found")]
    HoldNotFound {
        /// Hold the client referenced.
        hold_id: HoldId,
        /// Customer the client claimed the hold belongs to.
        customer_email: String,
    },

    /// No level in the requested range can satisfy the seat count.
    #[error("no seats available in the requested levels")]
    NoSeatsAvailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::LevelNotFound(_) => 2001,
            Self::HoldNotFound { .. } => 2002,
            Self::NoSeatsAvailable => 4001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::LevelNotFound(_) | Self::HoldNotFound { .. } => StatusCode::NOT_FOUND,
            Self::NoSeatsAvailable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Construction-time configuration failure.
///
/// Raised by [`crate::domain::TtlPolicy::new`],
/// [`crate::domain::LeaseManagerBuilder::build`] and
/// [`crate::domain::Venue::new`]. None of these are recoverable; the
/// component is simply not created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A lease manager needs at least one slot.
    #[error("capacity must be positive")]
    ZeroCapacity,

    /// Hold lifetime must be a positive duration.
    #[error("hold ttl must be positive")]
    NonPositiveTtl,

    /// A lease manager was built without an expiry policy.
    #[error("expiry policy is required")]
    MissingPolicy,

    /// The venue layout declares no seat levels.
    #[error("venue layout has no seat levels")]
    EmptyVenue,

    /// A seat level has an unusable shape.
    #[error("invalid seat level {level}: {reason}")]
    InvalidLevel {
        /// Index of the offending level.
        level: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// The venue layout could not be loaded or parsed.
    #[error("invalid venue layout: {0}")]
    InvalidLayout(String),
}
