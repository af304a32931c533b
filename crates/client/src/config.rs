//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PARFUMERIE_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `PARFUMERIE_DATA_DIR` - Directory for durable storage (default: `.parfumerie`)
//! - `PARFUMERIE_CURRENCY` - Display currency (default: USD)
//! - `PARFUMERIE_LOGIN_MAX_ATTEMPTS` - Admin login attempts per window (default: 5)
//! - `PARFUMERIE_LOGIN_WINDOW_SECS` - Admin login window in seconds (default: 900)
//! - `PARFUMERIE_SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use parfumerie_core::CurrencyCode;
use thiserror::Error;
use url::Url;

use crate::rate_limit::RateLimitConfig;

/// Name of the durable store file inside the data directory.
const DURABLE_STORE_FILE: &str = "storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (always ends with `/`)
    pub api_url: Url,
    /// Directory holding durable storage
    pub data_dir: PathBuf,
    /// Currency used for display formatting
    pub currency: CurrencyCode,
    /// Local limit on admin login attempts
    pub login_rate_limit: RateLimitConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("PARFUMERIE_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("PARFUMERIE_API_URL".to_string()))?;
        let api_url = parse_api_url(&raw_url)?;

        let data_dir = lookup("PARFUMERIE_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(".parfumerie"), PathBuf::from);

        let currency = parse_or_default(&lookup, "PARFUMERIE_CURRENCY", CurrencyCode::default())?;

        let defaults = RateLimitConfig::login();
        let max_attempts =
            parse_or_default(&lookup, "PARFUMERIE_LOGIN_MAX_ATTEMPTS", defaults.max_attempts)?;
        let window_secs = parse_or_default(
            &lookup,
            "PARFUMERIE_LOGIN_WINDOW_SECS",
            defaults.window.as_secs(),
        )?;

        Ok(Self {
            api_url,
            data_dir,
            currency,
            login_rate_limit: RateLimitConfig::new(max_attempts, Duration::from_secs(window_secs)),
            sentry_dsn: lookup("PARFUMERIE_SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
        })
    }

    /// Path of the durable store file.
    #[must_use]
    pub fn durable_store_path(&self) -> PathBuf {
        self.data_dir.join(DURABLE_STORE_FILE)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalise the API base URL.
///
/// Only http(s) URLs are accepted. A trailing slash is added so relative
/// endpoint paths join under the base path instead of replacing its last
/// segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PARFUMERIE_API_URL".to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}
