//! Checkout flow.
//!
//! Checkout requires an authenticated session and a non-empty basket. Order
//! processing is simulated: after a fixed delay the acting user's basket is
//! cleared and a confirmation is returned. A failed checkout leaves the
//! basket untouched and is not retried.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{Email, EmailError, LineItem, OrderId, Price, UserKey};
use thiserror::Error;

use crate::basket::BasketStore;
use crate::session::AuthSession;

/// Errors that can occur when placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No credential token in the session.
    #[error("sign in to place an order")]
    NotAuthenticated,

    /// Nothing to order.
    #[error("basket is empty")]
    EmptyBasket,

    /// A required form field is blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Contact email is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Shipping and payment details entered at checkout.
///
/// Implements `Debug` manually to redact card fields.
#[derive(Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub card_number: String,
    pub card_name: String,
    pub card_expiry: String,
    pub card_cvc: String,
}

impl std::fmt::Debug for CheckoutForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutForm")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("address", &self.address)
            .field("city", &self.city)
            .field("postal_code", &self.postal_code)
            .field("country", &self.country)
            .field("card_number", &"[REDACTED]")
            .field("card_name", &self.card_name)
            .field("card_expiry", &"[REDACTED]")
            .field("card_cvc", &"[REDACTED]")
            .finish()
    }
}

impl CheckoutForm {
    /// Check that every field is filled in and the email parses.
    ///
    /// # Errors
    ///
    /// Returns the first blank field in form order, or an invalid email.
    pub fn validate(&self) -> Result<Email, CheckoutError> {
        let required = [
            ("full_name", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
            ("card_number", &self.card_number),
            ("card_name", &self.card_name),
            ("card_expiry", &self.card_expiry),
            ("card_cvc", &self.card_cvc),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutError::MissingField(name));
        }

        Ok(Email::parse(&self.email)?)
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub placed_at: DateTime<Utc>,
    pub user: UserKey,
    pub items: Vec<LineItem>,
    pub total: Price,
    pub email: Email,
}

/// Places orders from a user's basket.
#[derive(Debug, Clone)]
pub struct Checkout {
    processing_delay: Duration,
}

impl Checkout {
    #[must_use]
    pub const fn new(processing_delay: Duration) -> Self {
        Self { processing_delay }
    }

    /// Place an order for `user`'s basket.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] if the session is anonymous, the basket is
    /// empty, or the form is incomplete. The basket is unchanged on error.
    pub async fn submit(
        &self,
        basket: &mut BasketStore,
        session: &AuthSession,
        form: &CheckoutForm,
        user: &UserKey,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if !session.is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }
        if basket.items(Some(user.as_str())).is_empty() {
            return Err(CheckoutError::EmptyBasket);
        }
        let email = form.validate()?;

        tokio::time::sleep(self.processing_delay).await;

        let items = basket.items(Some(user.as_str())).to_vec();
        let total = basket.total_price(Some(user.as_str()));
        basket.clear_basket(Some(user.as_str()));

        let confirmation = OrderConfirmation {
            order_id: OrderId::new(),
            placed_at: Utc::now(),
            user: user.clone(),
            items,
            total,
            email,
        };
        tracing::info!(
            order_id = %confirmation.order_id,
            user = %confirmation.user,
            total = %confirmation.total,
            lines = confirmation.items.len(),
            "Order placed"
        );
        Ok(confirmation)
    }
}
