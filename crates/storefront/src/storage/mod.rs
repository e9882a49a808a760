//! Local cart persistence.
//!
//! The cart lives under a single key in a small key-value store, read once
//! when the cart service starts and overwritten after every successful
//! mutation.
//!
//! - [`FileStore`] - JSON document on disk, written atomically
//! - [`MemoryStore`] - in-process map for tests and throwaway carts
//! - [`CartStore`] - (de)serializes the cart under its key

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use storefront_cart_core::{Cart, CartItem};
use thiserror::Error;
use tracing::warn;

/// Errors raised by cart persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document is not a JSON object of strings.
    #[error("Storage document is malformed: {0}")]
    Document(#[source] serde_json::Error),

    /// The value under `key` is not a serialized cart.
    #[error("Stored value for '{key}' is not a cart: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the cart failed.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The store refused the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// String key-value storage, in the spirit of browser-local storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Backend selected at startup.
#[derive(Debug)]
pub enum Storage {
    File(FileStore),
    Memory(MemoryStore),
}

impl KeyValueStore for Storage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::File(store) => store.get(key).await,
            Self::Memory(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Self::File(store) => store.set(key, value).await,
            Self::Memory(store) => store.set(key, value).await,
        }
    }
}

/// The persisted cart under one key.
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.store
    }

    /// Read the persisted cart. A missing key is an empty cart; lines with a
    /// quantity of 0 are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns `Corrupt` when the stored value does not parse, or the
    /// backend's error when it cannot be read.
    pub async fn load(&self) -> Result<Cart, StorageError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Cart::new());
        };
        let items: Vec<CartItem> =
            serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
                key: self.key.clone(),
                source,
            })?;

        let empty_lines = items.iter().filter(|item| item.amount == 0).count();
        if empty_lines > 0 {
            warn!(key = %self.key, empty_lines, "Dropping persisted cart lines with no quantity");
        }
        Ok(Cart::from_items(items))
    }

    /// Overwrite the persisted cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the write fails.
    pub async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart).map_err(StorageError::Serialize)?;
        self.store.set(&self.key, raw).await
    }
}
