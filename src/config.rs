//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The venue layout itself is a JSON
//! document referenced by `VENUE_CONFIG`; without it a built-in four-level
//! layout is used.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::domain::VenueLayout;
use crate::error::ConfigError;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Seating levels and hold lifetime.
    pub venue: VenueLayout,

    /// Hold ids start right after this value.
    pub hold_id_seed: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// `HOLD_TTL_SECS`, when set, overrides the layout's hold lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as a
    /// [`SocketAddr`], or if the venue layout cannot be read or is invalid.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()?;

        let mut venue = match std::env::var("VENUE_CONFIG").ok() {
            Some(path) => load_layout(PathBuf::from(path))?,
            None => VenueLayout::default(),
        };
        if let Some(ttl) = std::env::var("HOLD_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            venue.holds_expire_after_secs = ttl;
        }
        venue.validate()?;

        let hold_id_seed = parse_env("HOLD_ID_SEED", 1_000_000);
        let request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", 10);
        let log_format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            venue,
            hold_id_seed,
            request_timeout_secs,
            log_format,
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            venue: VenueLayout::default(),
            hold_id_seed: 1_000_000,
            request_timeout_secs: 10,
            log_format: LogFormat::Text,
        }
    }
}

/// Reads a JSON venue layout from disk.
fn load_layout(path: PathBuf) -> Result<VenueLayout, ConfigError> {
    let json = std::fs::read_to_string(&path)
        .map_err(|e| ConfigError::InvalidLayout(format!("{}: {e}", path.display())))?;
    VenueLayout::from_json(&json)
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert!(config.venue.validate().is_ok());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_layout_file_is_reported() {
        let err = load_layout(PathBuf::from("/definitely/not/here/venue.json"));
        assert!(matches!(err, Err(ConfigError::InvalidLayout(_))));
    }

    #[test]
    fn layout_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("venue-layout-{}.json", std::process::id()));
        let json = r#"{"seat_levels":[{"name":"Pit","rows":1,"seats_in_row":8}],"holds_expire_after_secs":5}"#;
        if std::fs::write(&path, json).is_err() {
            panic!("cannot write temp layout");
        }
        let loaded = load_layout(path.clone());
        let _ = std::fs::remove_file(&path);
        let Ok(layout) = loaded else {
            panic!("layout should load");
        };
        assert_eq!(layout.holds_expire_after_secs, 5);
        assert_eq!(layout.seat_levels.len(), 1);
    }

    #[test]
    fn parse_env_falls_back_on_garbage() {
        assert_eq!(parse_env("VENUE_GATEWAY_TEST_UNSET_KEY", 7u64), 7);
    }
}
