//! Shopfront storefront library.
//!
//! Per-user basket and favorites stores, the auth session, and the catalog
//! API client, all persisted through a pluggable [`storage::Storage`]
//! backend. Front ends drive everything through [`state::Storefront`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod basket;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod favorites;
pub mod identity;
pub mod session;
pub mod state;
pub mod storage;
