//! Catalog records and cart lines.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Product record as served by the catalog (`GET /products/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Stock snapshot as served by the catalog (`GET /stock/{id}`).
///
/// The catalog is the only authority on stock; a `Stock` value is only
/// meaningful for the operation that fetched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Catalog product ID.
    pub id: ProductId,
    /// Units available.
    pub amount: i64,
}

impl Stock {
    /// Whether `quantity` units can be held in a cart.
    #[must_use]
    pub fn covers(&self, quantity: u32) -> bool {
        i64::from(quantity) <= self.amount
    }
}

/// A product held in the cart together with its quantity.
///
/// Serializes flat (`{"id":1,"title":...,"amount":2}`), which is also the
/// persisted shape of each cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Quantity held in the cart, always at least 1.
    pub amount: u32,
}

impl CartItem {
    /// Create a cart line for `product` with a quantity of 1.
    #[must_use]
    pub const fn first_of(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity, or `None` if it does not fit a price.
    #[must_use]
    pub fn line_total(&self) -> Option<Price> {
        self.product.price.checked_times(self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sneaker() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Running sneaker".to_string(),
            price: Price::from_cents(17990),
            image: "https://cdn.example.test/sneaker.jpg".to_string(),
        }
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 2,
        };
        assert!(stock.covers(1));
        assert!(stock.covers(2));
        assert!(!stock.covers(3));

        let sold_out = Stock {
            id: ProductId::new(1),
            amount: 0,
        };
        assert!(!sold_out.covers(1));
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem {
            product: sneaker(),
            amount: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Running sneaker");
        assert_eq!(json["amount"], 2);
        assert!(json.get("product").is_none());
    }

    #[test]
    fn test_cart_item_reads_catalog_shaped_json() {
        let json = r#"{"id":3,"title":"Trail shoe","price":139.9,"image":"x.jpg","amount":4}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id(), ProductId::new(3));
        assert_eq!(item.amount, 4);
        assert_eq!(item.line_total(), Some(Price::from_cents(55960)));
    }

    #[test]
    fn test_first_of_starts_at_one() {
        assert_eq!(CartItem::first_of(sneaker()).amount, 1);
    }
}
