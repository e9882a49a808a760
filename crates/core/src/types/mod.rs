//! Core types for the storefront cart.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod id;
pub mod price;
pub mod product;

pub use id::*;
pub use price::Price;
pub use product::{CartItem, Product, Stock};
