//! Unified error handling with Sentry integration.
//!
//! `AppError` captures server-side failures to Sentry before responding. Cart
//! operation failures carry the unchanged cart so JSON clients can re-render
//! it next to the notification.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storefront_cart_core::{Cart, CartError};
use thiserror::Error;

use crate::notifications::notify_failure;
use crate::routes::cart::{CartPayload, CartView};
use crate::services::{CartOperation, ServiceError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart operation failed; the cart is unchanged.
    #[error("Cart {} failed: {source}", .operation.as_str())]
    CartOperation {
        operation: CartOperation,
        #[source]
        source: ServiceError,
        cart: Box<Cart>,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn cart_operation(operation: CartOperation, source: ServiceError, cart: Cart) -> Self {
        Self::CartOperation {
            operation,
            source,
            cart: Box::new(cart),
        }
    }

    /// HTTP status for this error. Only a coarse hint for cart failures.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::CartOperation { source, .. } => match source {
                ServiceError::Cart(CartError::OutOfStock { .. } | CartError::AlreadyInCart(_)) => {
                    StatusCode::CONFLICT
                }
                ServiceError::Cart(CartError::InvalidAmount(_)) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ServiceError::Cart(CartError::NotInCart(_)) => StatusCode::NOT_FOUND,
                ServiceError::Catalog(_) => StatusCode::BAD_GATEWAY,
                ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            Self::CartOperation {
                operation,
                source,
                cart,
            } => {
                if source.is_server_side() {
                    let event_id = sentry::capture_error(&source);
                    tracing::error!(
                        error = %source,
                        sentry_event_id = %event_id,
                        "Request error"
                    );
                }

                let payload = CartPayload {
                    cart: CartView::from(cart.as_ref()),
                    notification: Some(notify_failure(operation, &source)),
                };
                (status, Json(payload)).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a cart action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error.
pub fn add_breadcrumb(operation: CartOperation, product_id: Option<&str>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("cart".to_string()),
        message: Some(operation.as_str().to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(id) = product_id {
        breadcrumb.data.insert(
            "product_id".to_string(),
            serde_json::Value::String(id.to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
