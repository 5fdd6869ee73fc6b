//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::HoldService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Hold service for all business logic.
    pub hold_service: Arc<HoldService>,
}
