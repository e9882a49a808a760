//! User-visible notifications (toasts).
//!
//! Cart failures never propagate past the UI boundary: each one is turned
//! into a [`Notification`] here, and logged at a level matching where the
//! fault lies.

use serde::{Deserialize, Serialize};
use storefront_cart_core::Cart;

use crate::services::{CartOperation, ServiceError};

/// Shown whenever a requested quantity exceeds stock.
pub const OUT_OF_STOCK_MESSAGE: &str = "Requested quantity is out of stock";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// A non-fatal message reporting the outcome of a cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Generic failure message for `operation`.
#[must_use]
pub const fn failure_message(operation: CartOperation) -> &'static str {
    match operation {
        CartOperation::Add => "Error adding product",
        CartOperation::Remove => "Error removing product",
        CartOperation::UpdateAmount => "Error changing product quantity",
        CartOperation::Clear => "Error clearing cart",
    }
}

/// Success message for `operation`.
#[must_use]
pub const fn success_message(operation: CartOperation) -> &'static str {
    match operation {
        CartOperation::Add => "Product added to cart",
        CartOperation::Remove => "Product removed from cart",
        CartOperation::UpdateAmount => "Quantity updated",
        CartOperation::Clear => "Cart cleared",
    }
}

/// Turn a failed operation into the toast shown to the shopper.
///
/// Stock shortages get their own message; everything else gets the
/// operation's generic message. Catalog and storage faults are logged as
/// errors (and so reach Sentry), shopper mistakes only at info.
#[must_use]
pub fn notify_failure(operation: CartOperation, error: &ServiceError) -> Notification {
    if error.is_server_side() {
        tracing::error!(operation = operation.as_str(), error = %error, "Cart operation failed");
    } else {
        tracing::info!(operation = operation.as_str(), error = %error, "Cart operation rejected");
    }

    if error.is_out_of_stock() {
        Notification::error(OUT_OF_STOCK_MESSAGE)
    } else {
        Notification::error(failure_message(operation))
    }
}

/// Toast for the outcome of `operation`, success or failure.
#[must_use]
pub fn notify(operation: CartOperation, outcome: &Result<Cart, ServiceError>) -> Notification {
    match outcome {
        Ok(_) => Notification::success(success_message(operation)),
        Err(e) => notify_failure(operation, e),
    }
}

#[cfg(test)]
mod tests {
    use storefront_cart_core::{CartError, ProductId};

    use super::*;
    use crate::catalog::CatalogError;
    use crate::storage::StorageError;

    fn out_of_stock() -> ServiceError {
        ServiceError::Cart(CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        })
    }

    #[test]
    fn test_out_of_stock_message_for_add_and_update() {
        for op in [CartOperation::Add, CartOperation::UpdateAmount] {
            let notification = notify_failure(op, &out_of_stock());
            assert!(notification.is_error());
            assert_eq!(notification.message, OUT_OF_STOCK_MESSAGE);
        }
    }

    #[test]
    fn test_generic_messages_per_operation() {
        let catalog_down = ServiceError::Catalog(CatalogError::RateLimited(5));
        assert_eq!(
            notify_failure(CartOperation::Add, &catalog_down).message,
            "Error adding product"
        );

        let missing = ServiceError::Cart(CartError::NotInCart(ProductId::new(9)));
        assert_eq!(
            notify_failure(CartOperation::Remove, &missing).message,
            "Error removing product"
        );

        let invalid = ServiceError::Cart(CartError::InvalidAmount(0));
        assert_eq!(
            notify_failure(CartOperation::UpdateAmount, &invalid).message,
            "Error changing product quantity"
        );

        let disk = ServiceError::Storage(StorageError::Unavailable("full".to_string()));
        assert_eq!(
            notify_failure(CartOperation::Clear, &disk).message,
            "Error clearing cart"
        );
    }

    #[test]
    fn test_notify_success() {
        let notification = notify(CartOperation::Add, &Ok(Cart::new()));
        assert_eq!(notification, Notification::success("Product added to cart"));
        assert!(!notification.is_error());
    }

    #[test]
    fn test_notification_serializes_lowercase_level() {
        let json = serde_json::to_value(Notification::error("boom")).unwrap_or_default();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
    }
}
