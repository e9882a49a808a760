//! Storefront Cart Core - Cart types and rules.
//!
//! This crate holds everything about a shopping cart that does not touch the
//! network or the disk:
//! - `storefront` - axum server and library driving the cart service
//! - `cli` - command-line client for the same cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions. Mutations return an
//! updated copy of the [`Cart`] so callers can persist first and commit the
//! in-memory state only once the write succeeded.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, product records and stock snapshots
//! - [`cart`] - The cart collection and its stock/quantity rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, ensure_in_stock, validate_amount};
pub use types::*;
