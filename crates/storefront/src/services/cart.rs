//! Cart state container.
//!
//! [`CartService`] owns the in-memory cart, checks every quantity against a
//! fresh stock snapshot from the catalog, and persists the full cart after
//! each successful mutation.
//!
//! Each operation holds the cart lock from its first catalog request until
//! the new cart is committed, so operations never interleave. The updated cart
//! is written to storage *before* it replaces the in-memory copy: a failed
//! write leaves both unchanged.

use serde::{Deserialize, Serialize};
use storefront_cart_core::{Cart, CartError, ProductId, ensure_in_stock, validate_amount};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, instrument, warn};

use crate::catalog::{Catalog, CatalogError};
use crate::storage::{CartStore, KeyValueStore, StorageError};

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The mutation broke a cart rule (stock, quantity, presence).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Catalog request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// Whether the failure is a stock shortage.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        matches!(self, Self::Cart(CartError::OutOfStock { .. }))
    }

    /// Whether the failure originates outside the shopper's request.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::Storage(_))
    }
}

/// The cart operations a shopper can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
    Clear,
}

impl CartOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::UpdateAmount => "update_amount",
            Self::Clear => "clear",
        }
    }
}

/// Input for [`CartService::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested quantity; anything below 1 is rejected.
    pub amount: i64,
}

/// Stock-checked, persisted cart.
pub struct CartService<C, S> {
    catalog: C,
    store: CartStore<S>,
    cart: Mutex<Cart>,
}

impl<C, S> CartService<C, S>
where
    C: Catalog,
    S: KeyValueStore,
{
    /// Create the service, reading the persisted cart once.
    ///
    /// A stored value that does not parse is logged and replaced by an empty
    /// cart in memory; storage is left as-is until the next mutation.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the backend cannot be read at all.
    pub async fn load(catalog: C, store: CartStore<S>) -> Result<Self, StorageError> {
        let cart = match store.load().await {
            Ok(cart) => cart,
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(error = %e, "Discarding unreadable persisted cart");
                Cart::new()
            }
            Err(e) => return Err(e),
        };

        info!(
            key = store.key(),
            lines = cart.items().len(),
            "Loaded persisted cart"
        );

        Ok(Self {
            catalog,
            store,
            cart: Mutex::new(cart),
        })
    }

    /// Snapshot of the current cart.
    pub async fn cart(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub const fn catalog(&self) -> &C {
        &self.catalog
    }

    pub const fn store(&self) -> &CartStore<S> {
        &self.store
    }

    /// Add one unit of `product_id`.
    ///
    /// New products are fetched from the catalog and added with quantity 1;
    /// products already in the cart are incremented.
    ///
    /// # Errors
    ///
    /// Returns `OutOfStock` when the resulting quantity would exceed stock,
    /// or the catalog/storage error that interrupted the operation.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart, ServiceError> {
        let mut cart = self.cart.lock().await;

        let stock = self.catalog.stock(product_id).await?;
        let desired = cart.desired_quantity_for_add(product_id);
        ensure_in_stock(&stock, desired)?;

        let next = if cart.contains(product_id) {
            cart.with_incremented(product_id)?
        } else {
            let product = self.catalog.product(product_id).await?;
            cart.with_added(product)?
        };

        self.commit(&mut cart, next).await
    }

    /// Remove `product_id` from the cart.
    ///
    /// # Errors
    ///
    /// Returns `NotInCart` if the product is absent, or the storage error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart, ServiceError> {
        let mut cart = self.cart.lock().await;
        let next = cart.without(product_id)?;
        self.commit(&mut cart, next).await
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for amounts below 1, `NotInCart` if the
    /// product is absent, `OutOfStock` when the amount exceeds stock, or the
    /// catalog/storage error that interrupted the operation.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<Cart, ServiceError> {
        let amount = validate_amount(update.amount)?;

        let mut cart = self.cart.lock().await;
        if !cart.contains(update.product_id) {
            return Err(CartError::NotInCart(update.product_id).into());
        }

        let stock = self.catalog.stock(update.product_id).await?;
        ensure_in_stock(&stock, amount)?;

        let next = cart.with_amount(update.product_id, amount)?;
        self.commit(&mut cart, next).await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the empty cart cannot be persisted.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, ServiceError> {
        let mut cart = self.cart.lock().await;
        self.commit(&mut cart, Cart::new()).await
    }

    /// Persist `next`, then make it the current cart.
    async fn commit(
        &self,
        current: &mut MutexGuard<'_, Cart>,
        next: Cart,
    ) -> Result<Cart, ServiceError> {
        self.store.save(&next).await?;
        **current = next.clone();
        info!(
            lines = next.items().len(),
            items = next.item_count(),
            "Cart updated"
        );
        Ok(next)
    }
}
