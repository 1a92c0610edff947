//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_BASE_URL` - Base URL of the document backend (e.g., <https://api.docstore.dev/project-id>)
//! - `BACKEND_API_KEY` - API key for the document backend
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_TIMEOUT_SECS` - Per-request backend timeout (default: 10)
//! - `ORDER_SUBMIT_ATTEMPTS` - Max order submission attempts (default: 3)
//! - `ORDER_SUBMIT_BACKOFF_MS` - Base backoff between attempts (default: 200)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document backend configuration
    pub backend: BackendConfig,
    /// Order submission retry policy
    pub order_submit: OrderSubmitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Document backend connection configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend (no trailing slash)
    pub base_url: String,
    /// API key sent as `X-Api-Key` on every request
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Retry policy for the one backend call worth retrying: order creation.
#[derive(Debug, Clone, Copy)]
pub struct OrderSubmitConfig {
    /// Maximum attempts (first try included)
    pub attempts: u32,
    /// Base delay; doubles per attempt, plus jitter
    pub backoff: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            backend: BackendConfig::from_env()?,
            order_submit: OrderSubmitConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// The socket address to bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    /// Load the backend connection settings from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("BACKEND_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let api_key = get_required_env("BACKEND_API_KEY")?;
        let timeout_secs = get_env_or_default("BACKEND_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl OrderSubmitConfig {
    /// Load the retry policy from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let attempts = get_env_or_default("ORDER_SUBMIT_ATTEMPTS", "3")
            .parse::<u32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORDER_SUBMIT_ATTEMPTS".to_string(), e.to_string())
            })?;
        let backoff_ms = get_env_or_default("ORDER_SUBMIT_BACKOFF_MS", "200")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ORDER_SUBMIT_BACKOFF_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            attempts: attempts.max(1),
            backoff: Duration::from_millis(backoff_ms),
        })
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable (empty counts as unset).
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
