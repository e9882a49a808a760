//! Remote catalog and stock API.
//!
//! # Architecture
//!
//! - The catalog is the source of truth for product records and stock
//! - Plain JSON over HTTP via `reqwest`
//! - Product records are cached in memory via `moka`; stock never is
//!
//! # Endpoints
//!
//! ```text
//! GET {base}/stock/{id}     -> { "id": 1, "amount": 3 }
//! GET {base}/products/{id}  -> { "id": 1, "title": "...", "price": 179.9, "image": "..." }
//! ```

mod client;

pub use client::CatalogClient;

use std::future::Future;

use storefront_cart_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog answered with an unexpected status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the catalog.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}

/// Read access to the catalog.
///
/// Implemented by [`CatalogClient`] for the real API; tests substitute
/// in-process fakes.
pub trait Catalog: Send + Sync {
    /// Fetch a fresh stock snapshot for `id`.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Fetch the product record for `id`.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;
}
