//! Request and response types for the product and auth API.

use serde::{Deserialize, Deserializer, Serialize};
use shopfront_core::{Price, ProductId, ProductRef};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Upstream IDs may be numbers or strings; missing IDs become empty.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    /// Negative or malformed prices are treated as unknown.
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Price>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&Product> for ProductRef {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST /users`.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

/// A newly registered account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Price>, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value)
        .inspect_err(|e| tracing::warn!(error = %e, "Ignoring invalid product price"))
        .ok())
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ProductId, D::Error> {
    lenient_string(deserializer).map(ProductId::from)
}
