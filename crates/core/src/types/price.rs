//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices come from the upstream API as JSON numbers. They are held
//! as [`Decimal`] so basket totals never accumulate floating-point error.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from [`Price`] construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must not be negative")]
    Negative,
}

/// A non-negative unit or line price.
///
/// Serializes as a decimal string; deserializes from either a JSON number
/// or a string. Arithmetic saturates at [`Decimal::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest representable price.
    pub const MAX: Self = Self(Decimal::MAX);

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] for amounts below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Create a price from a number of minor units (e.g. cents).
    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from_i128_with_scale(i128::from(cents), 2))
    }

    /// Returns the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.checked_add(rhs.0).unwrap_or(Decimal::MAX))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times() {
        assert_eq!(Price::from_cents(1050).times(3), Price::from_cents(3150));
        assert_eq!(Price::from_cents(1050).times(0), Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(2000), Price::from_cents(500)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::new(Decimal::from(25)).unwrap());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::new(Decimal::from(25)).unwrap().to_string(), "25.00");
        assert_eq!(Price::from_cents(1995).to_string(), "19.95");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("109.95").unwrap();
        assert_eq!(price, Price::from_cents(10995));
    }

    #[test]
    fn test_deserialize_from_json_string() {
        let price: Price = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(price, Price::from_cents(750));
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::new(Decimal::from(-5)), Err(PriceError::Negative));
        assert!(serde_json::from_str::<Price>("-5").is_err());
        assert!(serde_json::from_str::<Price>("\"-0.01\"").is_err());
        assert_eq!(Price::new(Decimal::ZERO), Ok(Price::ZERO));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge: Price = serde_json::from_str("\"30000000000000000000\"").unwrap();
        assert_eq!(huge.times(u32::MAX), Price::MAX);
        assert_eq!(Price::MAX + Price::from_cents(1), Price::MAX);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1250)).unwrap();
        assert_eq!(json, "\"12.50\"");
    }
}
