//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::services::CartService;
use crate::storage::{CartStore, FileStore, Storage, StorageError};

/// The cart service as wired for the server: real catalog, selectable storage.
pub type StorefrontCartService = CartService<CatalogClient, Storage>;

/// Error building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("cart storage: {0}")]
    Storage(#[from] StorageError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the single cart service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    cart: StorefrontCartService,
}

impl AppState {
    /// Create the application state from configuration.
    ///
    /// Builds the catalog client and reads the persisted cart from the
    /// configured file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the cart file
    /// cannot be read.
    pub async fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let store = CartStore::new(
            Storage::File(FileStore::new(config.storage.path.clone())),
            config.storage.key.clone(),
        );
        let cart = CartService::load(catalog, store).await?;
        Ok(Self::from_parts(config, cart))
    }

    /// Assemble the state from an already-loaded cart service.
    #[must_use]
    pub fn from_parts(config: StorefrontConfig, cart: StorefrontCartService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, cart }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &StorefrontCartService {
        &self.inner.cart
    }
}
