//! Environment-driven configuration.

use anyhow::{Context, Result};
use chrono::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_VALIDITY_SECS: i64 = 3600;

// base64 of "dev-secret-not-for-production"
const DEV_SECRET: &str = "ZGV2LXNlY3JldC1ub3QtZm9yLXByb2R1Y3Rpb24=";

/// Runtime configuration, assembled from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string; absent means in-memory storage.
    pub database_url: Option<String>,
    /// Base64-encoded HMAC secret for session tokens.
    pub token_secret: String,
    /// Access token lifetime.
    pub token_validity: Duration,
    /// Listen address for the HTTP server.
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let token_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let validity_secs = match std::env::var("JWT_VALIDITY_SECS") {
            Ok(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("JWT_VALIDITY_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_TOKEN_VALIDITY_SECS,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            token_secret,
            token_validity: Duration::seconds(validity_secs),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}
