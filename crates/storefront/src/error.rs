//! Unified error handling.
//!
//! Store mutations never fail; persistence problems are logged where they
//! happen. `AppError` covers the fallible edges: configuration, the upstream
//! API, input parsing and checkout.

use shopfront_core::{EmailError, UserKeyError};
use thiserror::Error;

use crate::api::ApiError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Upstream API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Order could not be placed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// User key rejected.
    #[error("Invalid user: {0}")]
    InvalidUser(#[from] UserKeyError),

    /// Email address rejected.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// A required input was blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether the error was caused by user input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::Checkout(_)
            | Self::InvalidUser(_)
            | Self::InvalidEmail(_)
            | Self::MissingField(_)
            | Self::PasswordMismatch
            | Self::NotFound(_) => true,
            Self::Api(e) => matches!(e, ApiError::InvalidCredentials),
            Self::Config(_) | Self::Storage(_) => false,
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_source() {
        let err = AppError::from(CheckoutError::EmptyBasket);
        assert_eq!(err.to_string(), "Checkout error: basket is empty");

        let err = AppError::NotFound("product 42".to_string());
        assert_eq!(err.to_string(), "Not found: product 42");
    }

    #[test]
    fn test_user_errors() {
        assert!(AppError::from(ApiError::InvalidCredentials).is_user_error());
        assert!(AppError::NotFound(String::new()).is_user_error());
        assert!(!AppError::from(ApiError::MissingToken).is_user_error());
        assert!(
            !AppError::from(StorageError::InvalidKey("a/b".to_string())).is_user_error()
        );
    }
}
