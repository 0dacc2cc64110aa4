//! Subcommand implementations. Results are printed to stdout; diagnostics
//! go through `tracing`.

#![allow(clippy::print_stdout)]

pub mod auth;
pub mod basket;
pub mod catalog;
pub mod checkout;
pub mod favorites;

use shopfront_core::Price;

/// Render an optional price, `-` when unknown.
fn price_or_dash(price: Option<Price>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("${p}"))
}
