//! Cart commands.
//!
//! Each command runs one cart operation, prints its notification and the
//! resulting cart, and fails when the operation was rejected.

use std::io::{self, Write};

use storefront_cart::catalog::{CatalogClient, CatalogError};
use storefront_cart::config::{CatalogConfig, ConfigError, StorageConfig};
use storefront_cart::notifications::{Notification, notify};
use storefront_cart::services::{CartOperation, CartService, ServiceError, UpdateProductAmount};
use storefront_cart::storage::{CartStore, FileStore, StorageError};
use storefront_cart::routes::cart::TOTAL_UNAVAILABLE;
use storefront_cart_core::{Cart, Price, ProductId};
use thiserror::Error;

pub type Service = CartService<CatalogClient, FileStore>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),
    #[error("output: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Build the cart service from the environment, reading the persisted cart.
///
/// # Errors
///
/// Returns an error if configuration is missing or the cart file is unreadable.
pub async fn load_service() -> Result<Service, CliError> {
    let _ = dotenvy::dotenv();

    let catalog = CatalogClient::new(&CatalogConfig::from_env()?)?;
    let storage = StorageConfig::from_env();
    let store = CartStore::new(FileStore::new(storage.path), storage.key);

    Ok(CartService::load(catalog, store).await?)
}

pub async fn show(service: &Service) -> Result<(), CliError> {
    let cart = service.cart().await;
    print_cart(&mut io::stdout().lock(), &cart, None)?;
    Ok(())
}

pub async fn add(service: &Service, product_id: ProductId) -> Result<(), CliError> {
    let outcome = service.add_product(product_id).await;
    report(service, CartOperation::Add, outcome).await
}

pub async fn remove(service: &Service, product_id: ProductId) -> Result<(), CliError> {
    let outcome = service.remove_product(product_id).await;
    report(service, CartOperation::Remove, outcome).await
}

pub async fn update(service: &Service, product_id: ProductId, amount: i64) -> Result<(), CliError> {
    let outcome = service
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await;
    report(service, CartOperation::UpdateAmount, outcome).await
}

pub async fn clear(service: &Service) -> Result<(), CliError> {
    let outcome = service.clear().await;
    report(service, CartOperation::Clear, outcome).await
}

/// Print the outcome of `operation`, failing if it was rejected.
async fn report(
    service: &Service,
    operation: CartOperation,
    outcome: Result<Cart, ServiceError>,
) -> Result<(), CliError> {
    let notification = notify(operation, &outcome);
    let cart = match outcome {
        Ok(cart) => cart,
        Err(_) => service.cart().await,
    };

    print_cart(&mut io::stdout().lock(), &cart, Some(&notification))?;

    if notification.is_error() {
        return Err(CliError::Rejected(notification.message));
    }
    Ok(())
}

fn format_total(total: Option<Price>) -> String {
    total.map_or_else(|| TOTAL_UNAVAILABLE.to_string(), |price| price.to_string())
}

fn print_cart(
    out: &mut impl Write,
    cart: &Cart,
    notification: Option<&Notification>,
) -> io::Result<()> {
    if let Some(n) = notification {
        let tag = if n.is_error() { "error" } else { "ok" };
        writeln!(out, "[{tag}] {}", n.message)?;
    }

    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for item in cart.items() {
        writeln!(
            out,
            "#{:<6} {:<40} {:>3} x {:>10} = {:>10}",
            item.id().as_i64(),
            item.product.title,
            item.amount,
            item.product.price.to_string(),
            format_total(item.line_total()),
        )?;
    }
    writeln!(
        out,
        "Total: {} ({} items)",
        format_total(cart.subtotal()),
        cart.item_count()
    )
}
