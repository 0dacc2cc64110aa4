//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPFRONT_API_BASE_URL` - Product/auth API root (default: `https://fakestoreapi.com`)
//! - `SHOPFRONT_DATA_DIR` - Directory for persisted stores (default: `.shopfront`)
//! - `SHOPFRONT_CACHE_TTL_SECS` - Product list cache lifetime (default: 60)
//! - `SHOPFRONT_API_RETRIES` - Extra attempts for failed catalog reads (default: 1)
//! - `SHOPFRONT_API_RETRY_DELAY_MS` - Pause before the first retry, doubled per attempt (default: 1000)
//! - `SHOPFRONT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPFRONT_CHECKOUT_DELAY_MS` - Simulated order processing time (default: 2000)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_DATA_DIR: &str = ".shopfront";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Upstream API configuration
    pub api: ApiConfig,
    /// Directory holding the persisted session, basket and favorites records
    pub data_dir: PathBuf,
    /// Simulated payment processing time at checkout
    pub checkout_delay: Duration,
}

/// Product and auth API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root; endpoint paths are joined onto it
    pub base_url: Url,
    /// How long a fetched product list is served from cache
    pub cache_ttl: Duration,
    /// Extra attempts for catalog reads after a transient failure
    pub retries: u32,
    /// Pause before the first retry; doubles on each further attempt
    pub retry_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// API configuration with default cache, retry and timeout settings.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            cache_ttl: Duration::from_secs(60),
            retries: 1,
            retry_delay: Duration::from_millis(1000),
            timeout: Duration::from_secs(10),
        }
    }
}

impl StorefrontConfig {
    /// Configuration with defaults for everything but the API root.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            api: ApiConfig::new(base_url),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            checkout_delay: Duration::from_millis(2000),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("SHOPFRONT_API_BASE_URL")
            .map_or_else(|| parse_base_url(DEFAULT_API_BASE_URL), |raw| parse_base_url(&raw))?;
        let cache_ttl = parse_or(&lookup, "SHOPFRONT_CACHE_TTL_SECS", 60)?;
        let retries = parse_or(&lookup, "SHOPFRONT_API_RETRIES", 1)?;
        let retry_delay = parse_or(&lookup, "SHOPFRONT_API_RETRY_DELAY_MS", 1000)?;
        let timeout = parse_or(&lookup, "SHOPFRONT_HTTP_TIMEOUT_SECS", 10)?;
        let checkout_delay = parse_or(&lookup, "SHOPFRONT_CHECKOUT_DELAY_MS", 2000)?;
        let data_dir =
            lookup("SHOPFRONT_DATA_DIR").map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Ok(Self {
            api: ApiConfig {
                base_url,
                cache_ttl: Duration::from_secs(cache_ttl),
                retries,
                retry_delay: Duration::from_millis(retry_delay),
                timeout: Duration::from_secs(timeout),
            },
            data_dir,
            checkout_delay: Duration::from_millis(checkout_delay),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an API root, forcing a trailing slash so `Url::join` appends paths.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| {
        ConfigError::InvalidEnvVar("SHOPFRONT_API_BASE_URL".to_string(), e.to_string())
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPFRONT_API_BASE_URL".to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a variable when present, otherwise use `default`.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.api.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.api.retries, 1);
        assert_eq!(config.api.retry_delay, Duration::from_secs(1));
        assert_eq!(config.data_dir, PathBuf::from(".shopfront"));
        assert_eq!(config.checkout_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("SHOPFRONT_API_BASE_URL", "http://127.0.0.1:8080/api"),
            ("SHOPFRONT_CACHE_TTL_SECS", "5"),
            ("SHOPFRONT_API_RETRIES", "0"),
            ("SHOPFRONT_DATA_DIR", "/tmp/shop"),
            ("SHOPFRONT_CHECKOUT_DELAY_MS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:8080/api/");
        assert_eq!(config.api.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.api.retries, 0);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(config.checkout_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_number() {
        let err = StorefrontConfig::from_lookup(lookup(&[("SHOPFRONT_API_RETRIES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "SHOPFRONT_API_RETRIES"));
    }

    #[test]
    fn test_invalid_url() {
        let err = StorefrontConfig::from_lookup(lookup(&[("SHOPFRONT_API_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_lookup(lookup(&[("SHOPFRONT_API_BASE_URL", "mailto:a@b")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
