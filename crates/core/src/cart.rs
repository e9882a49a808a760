//! The cart collection and its quantity rules.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s with at most one entry per
//! product. Every mutation returns a new cart and leaves `self` untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CartItem, Price, Product, ProductId, Stock};

/// Why a cart mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity exceeds the catalog's stock.
    #[error("Product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// Quantities must be at least 1.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// The product has no entry in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The product already has an entry in the cart.
    #[error("Product {0} is already in the cart")]
    AlreadyInCart(ProductId),
}

/// Ordered collection of product/quantity pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from persisted items.
    ///
    /// Duplicate IDs are merged into the first occurrence, keeping the larger
    /// quantity, so a hand-edited store cannot break the one-entry invariant.
    /// Lines with a quantity of 0 are dropped.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|item| item.amount > 0) {
            match cart.items.iter_mut().find(|i| i.id() == item.id()) {
                Some(existing) => existing.amount = existing.amount.max(item.amount),
                None => cart.items.push(item),
            }
        }
        cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity held for `id`, or 0 when absent.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line totals, or `None` if any total overflows.
    #[must_use]
    pub fn subtotal(&self) -> Option<Price> {
        self.items
            .iter()
            .try_fold(Price::ZERO, |total, item| total.checked_add(item.line_total()?))
    }

    /// Quantity the cart would hold for `id` after adding one more unit.
    #[must_use]
    pub fn desired_quantity_for_add(&self, id: ProductId) -> u32 {
        self.quantity_of(id).saturating_add(1)
    }

    /// Append `product` with a quantity of 1.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInCart` if the product already has an entry.
    pub fn with_added(&self, product: Product) -> Result<Self, CartError> {
        if self.contains(product.id) {
            return Err(CartError::AlreadyInCart(product.id));
        }
        let mut next = self.clone();
        next.items.push(CartItem::first_of(product));
        Ok(next)
    }

    /// Increase the quantity of an existing entry by one.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product has no entry.
    pub fn with_incremented(&self, id: ProductId) -> Result<Self, CartError> {
        let amount = self.desired_quantity_for_add(id);
        self.with_amount(id, amount)
    }

    /// Set the quantity of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for 0 and `NotInCart` if the product has no entry.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Result<Self, CartError> {
        if amount == 0 {
            return Err(CartError::InvalidAmount(0));
        }
        let mut next = self.clone();
        let item = next
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(CartError::NotInCart(id))?;
        item.amount = amount;
        Ok(next)
    }

    /// Drop the entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product has no entry.
    pub fn without(&self, id: ProductId) -> Result<Self, CartError> {
        if !self.contains(id) {
            return Err(CartError::NotInCart(id));
        }
        let items = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Ok(Self { items })
    }
}

/// Check a desired quantity against a stock snapshot.
///
/// # Errors
///
/// Returns `OutOfStock` when `desired` exceeds `stock.amount`.
pub fn ensure_in_stock(stock: &Stock, desired: u32) -> Result<(), CartError> {
    if stock.covers(desired) {
        Ok(())
    } else {
        Err(CartError::OutOfStock {
            product_id: stock.id,
            requested: desired,
            available: stock.amount,
        })
    }
}

/// Validate a user-supplied quantity.
///
/// # Errors
///
/// Returns `InvalidAmount` for anything below 1 or beyond `u32::MAX`.
pub fn validate_amount(amount: i64) -> Result<u32, CartError> {
    if amount < 1 {
        return Err(CartError::InvalidAmount(amount));
    }
    u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(cents),
            image: format!("https://cdn.example.test/{id}.jpg"),
        }
    }

    fn stock(id: i64, amount: i64) -> Stock {
        Stock {
            id: ProductId::new(id),
            amount,
        }
    }

    #[test]
    fn test_new_product_is_added_with_quantity_one() {
        let cart = Cart::new().with_added(product(1, 1000)).unwrap();
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_with_added_rejects_duplicates() {
        let cart = Cart::new().with_added(product(1, 1000)).unwrap();
        let err = cart.with_added(product(1, 1000)).unwrap_err();
        assert_eq!(err, CartError::AlreadyInCart(ProductId::new(1)));
    }

    #[test]
    fn test_desired_quantity_for_add() {
        let cart = Cart::new().with_added(product(1, 1000)).unwrap();
        assert_eq!(cart.desired_quantity_for_add(ProductId::new(1)), 2);
        assert_eq!(cart.desired_quantity_for_add(ProductId::new(2)), 1);
    }

    #[test]
    fn test_with_incremented_leaves_original_untouched() {
        let cart = Cart::new().with_added(product(1, 1000)).unwrap();
        let next = cart.with_incremented(ProductId::new(1)).unwrap();
        assert_eq!(cart.quantity_of(ProductId::new(1)), 1);
        assert_eq!(next.quantity_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_with_incremented_missing_product() {
        let err = Cart::new().with_incremented(ProductId::new(9)).unwrap_err();
        assert_eq!(err, CartError::NotInCart(ProductId::new(9)));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let cart = Cart::new()
            .with_added(product(3, 100))
            .unwrap()
            .with_added(product(1, 100))
            .unwrap()
            .with_added(product(2, 100))
            .unwrap();
        let ids: Vec<i64> = cart.items().iter().map(|i| i.id().as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let cart = cart.with_amount(ProductId::new(1), 5).unwrap();
        let ids: Vec<i64> = cart.items().iter().map(|i| i.id().as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_without_removes_only_that_product() {
        let cart = Cart::new()
            .with_added(product(1, 100))
            .unwrap()
            .with_added(product(2, 100))
            .unwrap();
        let next = cart.without(ProductId::new(1)).unwrap();
        assert!(!next.contains(ProductId::new(1)));
        assert!(next.contains(ProductId::new(2)));
    }

    #[test]
    fn test_without_missing_product_errors() {
        let cart = Cart::new().with_added(product(1, 100)).unwrap();
        let err = cart.without(ProductId::new(2)).unwrap_err();
        assert_eq!(err, CartError::NotInCart(ProductId::new(2)));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_with_amount_zero_is_rejected() {
        let cart = Cart::new().with_added(product(1, 100)).unwrap();
        assert_eq!(
            cart.with_amount(ProductId::new(1), 0).unwrap_err(),
            CartError::InvalidAmount(0)
        );
    }

    #[test]
    fn test_ensure_in_stock() {
        assert!(ensure_in_stock(&stock(1, 3), 3).is_ok());
        let err = ensure_in_stock(&stock(1, 3), 4).unwrap_err();
        assert_eq!(
            err,
            CartError::OutOfStock {
                product_id: ProductId::new(1),
                requested: 4,
                available: 3,
            }
        );
        assert!(ensure_in_stock(&stock(1, -2), 1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(1).unwrap(), 1);
        assert_eq!(validate_amount(0).unwrap_err(), CartError::InvalidAmount(0));
        assert_eq!(
            validate_amount(-3).unwrap_err(),
            CartError::InvalidAmount(-3)
        );
        assert!(validate_amount(i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::new()
            .with_added(product(1, 1000))
            .unwrap()
            .with_added(product(2, 250))
            .unwrap()
            .with_amount(ProductId::new(2), 3)
            .unwrap();
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), Some(Price::from_cents(1750)));
        assert_eq!(Cart::new().subtotal(), Some(Price::ZERO));
    }

    #[test]
    fn test_from_items_merges_duplicates() {
        let cart = Cart::from_items(vec![
            CartItem {
                product: product(1, 100),
                amount: 2,
            },
            CartItem {
                product: product(2, 100),
                amount: 1,
            },
            CartItem {
                product: product(1, 100),
                amount: 5,
            },
        ]);
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 5);
    }

    #[test]
    fn test_from_items_drops_zero_amount_lines() {
        let cart = Cart::from_items(vec![
            CartItem {
                product: product(1, 100),
                amount: 0,
            },
            CartItem {
                product: product(2, 100),
                amount: 3,
            },
        ]);
        assert_eq!(cart.items().len(), 1);
        assert!(!cart.contains(ProductId::new(1)));
        assert_eq!(cart.quantity_of(ProductId::new(2)), 3);
    }

    #[test]
    fn test_subtotal_overflow_is_none() {
        let huge = Product {
            price: Price::new(rust_decimal::Decimal::MAX),
            ..product(1, 0)
        };
        let cart = Cart::new()
            .with_added(huge)
            .unwrap()
            .with_amount(ProductId::new(1), 2)
            .unwrap();

        assert_eq!(cart.items()[0].line_total(), None);
        assert_eq!(cart.subtotal(), None);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_cart_serializes_as_array() {
        let cart = Cart::new().with_added(product(1, 100)).unwrap();
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["amount"], 1);

        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
