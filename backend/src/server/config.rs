//! HTTP server configuration object and helpers.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tracing::warn;
use url::Url;
use uuid::Uuid;

use crate::domain::{TokenConfig, DEFAULT_TTL_HOURS};
use crate::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SCORING_URL: &str = "http://localhost:5000/predict";
const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 30;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) token: TokenConfig,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) scoring_url: Url,
    pub(crate) scoring_timeout: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(token: TokenConfig, bind_addr: SocketAddr, scoring_url: Url) -> Self {
        Self {
            token,
            bind_addr,
            scoring_url,
            scoring_timeout: Duration::from_secs(DEFAULT_SCORING_TIMEOUT_SECS),
            db_pool: None,
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// Recognised variables:
    /// - `BIND_ADDR` (default `0.0.0.0:8080`)
    /// - `JWT_SECRET` (required in release builds; debug builds fall back to
    ///   an ephemeral secret, as does `JWT_ALLOW_EPHEMERAL=1`)
    /// - `TOKEN_TTL_HOURS` (default 24)
    /// - `SCORING_URL` (default `http://localhost:5000/predict`)
    /// - `SCORING_TIMEOUT_SECS` (default 30)
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when a variable is present but unparseable,
    /// or when no signing secret is available in a release build.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = parse_env("BIND_ADDR", DEFAULT_BIND_ADDR.parse().map_err(io_other)?)?;
        let ttl_hours = parse_env("TOKEN_TTL_HOURS", DEFAULT_TTL_HOURS)?;
        let scoring_url = parse_env("SCORING_URL", DEFAULT_SCORING_URL.parse().map_err(io_other)?)?;
        let scoring_timeout_secs = parse_env("SCORING_TIMEOUT_SECS", DEFAULT_SCORING_TIMEOUT_SECS)?;

        let secret = signing_secret_from_env()?;
        let token = TokenConfig::new(secret, ChronoDuration::hours(ttl_hours));

        Ok(Self {
            token,
            bind_addr,
            scoring_url,
            scoring_timeout: Duration::from_secs(scoring_timeout_secs),
            db_pool: None,
        })
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for the
    /// credential and prediction stores; otherwise it falls back to in-memory
    /// ones suitable for local runs and tests.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Override the scoring engine request timeout.
    #[must_use]
    pub fn with_scoring_timeout(mut self, timeout: Duration) -> Self {
        self.scoring_timeout = timeout;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn io_other(error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(error.to_string())
}

fn parse_env<T>(name: &str, default: T) -> std::io::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid {name} {raw:?}: {err}"))),
        Err(_) => Ok(default),
    }
}

/// Resolve the token signing secret, generating an ephemeral one only where a
/// restart-invalidated session is acceptable.
fn signing_secret_from_env() -> std::io::Result<String> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ => {
            let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!("JWT_SECRET unset, using an ephemeral signing secret (dev only)");
                Ok(format!("ephemeral-{}-{}", Uuid::new_v4(), Uuid::new_v4()))
            } else {
                Err(std::io::Error::other(
                    "JWT_SECRET must be set in release builds",
                ))
            }
        }
    }
}
