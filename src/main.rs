//! venue-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use venue_gateway::api;
use venue_gateway::app_state::AppState;
use venue_gateway::config::{GatewayConfig, LogFormat};
use venue_gateway::domain::{HoldIdCounter, Venue};
use venue_gateway::service::HoldService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()
        .map_err(anyhow::Error::from_boxed)
        .context("loading gateway configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting venue-gateway");

    // Build domain layer
    let ids = HoldIdCounter::starting_after(config.hold_id_seed);
    let venue = Arc::new(Venue::new(config.venue.clone(), ids).context("building venue")?);

    // Build service layer
    let hold_service = Arc::new(HoldService::new(venue));

    // Build application
    let app_state = AppState { hold_service };
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
