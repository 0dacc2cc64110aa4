//! Product catalog and account API client.
//!
//! # Architecture
//!
//! - JSON over HTTP with `reqwest`
//! - The product list is cached in memory via `moka` (TTL from config)
//! - Catalog reads are retried on transport errors and 5xx responses;
//!   login and registration are never retried
//!
//! # Endpoints
//!
//! - `GET  products` - full catalog
//! - `POST auth/login` - `{ username, password }` to `{ token }`
//! - `POST users` - `{ email, username, password }` to `{ id }`

mod types;

pub use types::{Product, RegisteredUser};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shopfront_core::Email;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ApiConfig;
use types::{LoginRequest, LoginResponse, RegisterRequest};

const PRODUCTS_CACHE_KEY: &str = "products";

/// Errors that can occur when calling the upstream API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Username or password rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Login succeeded but no token was returned.
    #[error("login response did not contain a token")]
    MissingToken,

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Whether repeating the request might succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Client for the product and account API.
///
/// Cheap to clone; clones share the HTTP pool and the product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    retries: u32,
    retry_delay: Duration,
    products: Cache<&'static str, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("retries", &self.inner.retries)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                retries: config.retries,
                retry_delay: config.retry_delay,
                products,
            }),
        })
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the full product list, served from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if every attempt fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.products.get(PRODUCTS_CACHE_KEY).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.get_with_retry("products").await?);
        debug!(count = products.len(), "Fetched product list");

        self.inner
            .products
            .insert(PRODUCTS_CACHE_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// Drop the cached product list.
    pub async fn invalidate_products(&self) {
        self.inner.products.invalidate(PRODUCTS_CACHE_KEY).await;
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidCredentials`] on 401, [`ApiError::MissingToken`]
    /// when the response has no token, or a transport/status error.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };

        let response: LoginResponse = match self.post("auth/login", &body).await {
            Err(ApiError::Status { status: 401, .. }) => return Err(ApiError::InvalidCredentials),
            other => other?,
        };

        response
            .token
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
            .ok_or(ApiError::MissingToken)
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or upstream rejects it.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &Email,
        username: &str,
        password: &SecretString,
    ) -> Result<RegisteredUser, ApiError> {
        let body = RegisterRequest {
            email: email.as_str(),
            username,
            password: password.expose_secret(),
        };
        self.post("users", &body).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            match self.get(path).await {
                Err(e) if e.is_transient() && attempt < self.inner.retries => {
                    let delay = self.inner.retry_delay.saturating_mul(2_u32.saturating_pow(attempt));
                    attempt += 1;
                    warn!(path, attempt, error = %e, ?delay, "Retrying API request");
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.get(url).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        decode(response).await
    }
}

/// Check the status, then parse the body as JSON.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    // Read as text first for better error diagnostics
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text.chars().take(500).collect(),
        });
    }

    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            body = %text.chars().take(500).collect::<String>(),
            "Unexpected API response body"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_statuses() {
        let server_error = ApiError::Status {
            status: 503,
            body: String::new(),
        };
        let client_error = ApiError::Status {
            status: 404,
            body: String::new(),
        };
        assert!(server_error.is_transient());
        assert!(!client_error.is_transient());
        assert!(!ApiError::InvalidCredentials.is_transient());
        assert!(!ApiError::MissingToken.is_transient());
    }
}
