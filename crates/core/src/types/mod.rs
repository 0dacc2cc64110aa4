//! Core types for shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod user_key;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{FavoriteEntry, LineItem, ProductRef};
pub use status::AuthState;
pub use user_key::{UserKey, UserKeyError};
