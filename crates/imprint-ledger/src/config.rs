//! Ledger client configuration.
//!
//! [`TrackerConfig`] sets confirmation polling. [`HttpProviderConfig`]
//! points the HTTP provider at a relay. Both load from environment
//! variables or explicit construction for tests.

use std::time::Duration;

use url::Url;

/// Default interval between receipt polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default time to wait for confirmation before failing with a timeout.
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(120);

/// Shortest interval the tracker will poll at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default relay request timeout in seconds.
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;

/// Confirmation polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Delay between receipt polls.
    pub poll_interval: Duration,
    /// Deadline after which a pending mutation fails with `Timeout`.
    pub timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `IMPRINT_POLL_INTERVAL_MS` (default: 1000)
    /// - `IMPRINT_CONFIRM_TIMEOUT_SECS` (default: 120)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] if either variable is set to zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env_u64("IMPRINT_POLL_INTERVAL_MS")?,
            env_u64("IMPRINT_CONFIRM_TIMEOUT_SECS")?,
        )
    }

    fn from_values(poll_ms: Option<u64>, timeout_secs: Option<u64>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            poll_interval: positive("IMPRINT_POLL_INTERVAL_MS", poll_ms)?
                .map_or(defaults.poll_interval, Duration::from_millis),
            timeout: positive("IMPRINT_CONFIRM_TIMEOUT_SECS", timeout_secs)?
                .map_or(defaults.timeout, Duration::from_secs),
        })
    }
}

/// Relay connection settings for
/// [`HttpNetworkProvider`](crate::http::HttpNetworkProvider).
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct HttpProviderConfig {
    /// Base URL of the relay service.
    pub base_url: Url,
    /// Bearer token, if the relay requires one.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for HttpProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HttpProviderConfig {
    /// A config for `base_url` with no token and the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout_secs: DEFAULT_RELAY_TIMEOUT_SECS,
        }
    }

    /// Parse `base_url` and build a config from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the URL cannot be parsed.
    pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
        Url::parse(base_url)
            .map(Self::new)
            .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `IMPRINT_RELAY_URL` (required)
    /// - `IMPRINT_RELAY_TOKEN` (optional)
    /// - `IMPRINT_RELAY_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw =
            std::env::var("IMPRINT_RELAY_URL").map_err(|_| ConfigError::Missing("IMPRINT_RELAY_URL"))?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl("IMPRINT_RELAY_URL".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: std::env::var("IMPRINT_RELAY_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            timeout_secs: positive(
                "IMPRINT_RELAY_TIMEOUT_SECS",
                env_u64("IMPRINT_RELAY_TIMEOUT_SECS")?,
            )?
            .unwrap_or(DEFAULT_RELAY_TIMEOUT_SECS),
        })
    }
}

fn env_u64(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(var, raw)),
        Err(_) => Ok(None),
    }
}

fn positive(var: &'static str, value: Option<u64>) -> Result<Option<u64>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Zero(var)),
        other => Ok(other),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("{0} must be a non-negative integer, got {1:?}")]
    InvalidNumber(&'static str, String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("relay API token contains characters not allowed in a header")]
    InvalidToken,
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}
