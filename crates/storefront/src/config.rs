//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CATALOG_URL` - Base URL of the product/stock catalog API
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STORE_CURRENCY` - ISO 4217 display currency (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use shoestring_core::CurrencyCode;

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
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Base URL of the product/stock catalog API
    pub catalog_url: Url,
    /// Currency used to display prices
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        // Parse the catalog URL up front so a malformed value fails at boot,
        // not on the first cart mutation.
        let catalog_url = Url::parse(&get_required_env("CATALOG_URL")?)
            .map_err(|e| ConfigError::InvalidEnvVar("CATALOG_URL".to_string(), e.to_string()))?;
        let currency = get_env_or_default("STORE_CURRENCY", "USD")
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_CURRENCY".to_string(), e.to_string())
            })?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            catalog_url,
            currency,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            catalog_url: Url::parse("http://localhost:3333").unwrap(),
            currency: CurrencyCode::USD,
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = test_config();
        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("postgres://localhost/test"));
    }
}
