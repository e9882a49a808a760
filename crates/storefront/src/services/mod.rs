//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `cart` - Stock-checked cart state with local persistence

pub mod cart;

pub use cart::{CartOperation, CartService, ServiceError, UpdateProductAmount};
