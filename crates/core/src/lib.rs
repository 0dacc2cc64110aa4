//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every shopfront component:
//! - `shopfront` - Basket, favorites and session stores plus the API client
//! - `shopfront-cli` - Command-line driver for the stores
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. Invariants (non-empty user keys, positive quantities,
//! well-formed emails) are enforced by constructors here so the stores can
//! rely on them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for user keys, IDs, prices, emails and
//!   product references

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
