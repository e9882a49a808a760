//! Integration tests for the storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-cart-integration-tests
//! ```
//!
//! No external services are needed: [`FakeCatalog`] serves `/stock/{id}` and
//! `/products/{id}` from an in-process axum server on an ephemeral port, and
//! [`TestContext`] runs the real storefront router against it.
//!
//! # Test Categories
//!
//! - `cart_api` - JSON cart API behaviour and persistence
//! - `cart_page` - HTML cart page forms
//! - `catalog_client` - reqwest client against the fake catalog
//! - `router` - health check and middleware

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use storefront_cart::catalog::CatalogClient;
use storefront_cart::config::{
    CatalogConfig, DEFAULT_CART_STORAGE_KEY, StorageConfig, StorefrontConfig,
};
use storefront_cart::routes;
use storefront_cart::services::CartService;
use storefront_cart::state::AppState;
use storefront_cart::storage::{CartStore, KeyValueStore, MemoryStore, Storage};
use storefront_cart_core::Cart;

// =============================================================================
// Fake catalog
// =============================================================================

#[derive(Default)]
struct FakeCatalogState {
    stock: Mutex<HashMap<i64, i64>>,
    products: Mutex<HashMap<i64, Value>>,
    stock_requests: AtomicUsize,
    product_requests: AtomicUsize,
    offline: AtomicBool,
}

/// In-process catalog API with request counters.
#[derive(Clone)]
pub struct FakeCatalog {
    state: Arc<FakeCatalogState>,
    addr: SocketAddr,
}

impl FakeCatalog {
    /// Start the fake catalog on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = Arc::new(FakeCatalogState::default());

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self { state, addr }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Register a product with a price in cents and an initial stock level.
    pub fn add_product(&self, id: i64, title: &str, price_cents: i64, stock: i64) {
        #[allow(clippy::cast_precision_loss)]
        let price = price_cents as f64 / 100.0;
        self.state.products.lock().unwrap().insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.test/{id}.jpg"),
            }),
        );
        self.set_stock(id, stock);
    }

    pub fn set_stock(&self, id: i64, amount: i64) {
        self.state.stock.lock().unwrap().insert(id, amount);
    }

    /// Make every request answer 503.
    pub fn set_offline(&self, offline: bool) {
        self.state.offline.store(offline, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.stock_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.product_requests.load(Ordering::SeqCst)
    }
}

async fn stock(State(state): State<Arc<FakeCatalogState>>, Path(id): Path<i64>) -> Response {
    state.stock_requests.fetch_add(1, Ordering::SeqCst);
    if state.offline.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "offline").into_response();
    }
    let amount = state.stock.lock().unwrap().get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn product(State(state): State<Arc<FakeCatalogState>>, Path(id): Path<i64>) -> Response {
    state.product_requests.fetch_add(1, Ordering::SeqCst);
    if state.offline.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "offline").into_response();
    }
    let record = state.products.lock().unwrap().get(&id).cloned();
    match record {
        Some(record) => Json(record).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serve `app` on an ephemeral local port for the rest of the test.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

// =============================================================================
// Storefront under test
// =============================================================================

/// Configuration pointing the storefront at `catalog`.
#[must_use]
pub fn test_config(catalog: &FakeCatalog) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        store_name: "Test Store".to_string(),
        catalog: CatalogConfig::for_base_url(&catalog.base_url()).unwrap(),
        storage: StorageConfig {
            path: PathBuf::from("unused.json"),
            key: DEFAULT_CART_STORAGE_KEY.to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Build application state over `storage`, reading any persisted cart.
pub async fn build_state(catalog: &FakeCatalog, storage: Storage) -> AppState {
    let config = test_config(catalog);
    let client = CatalogClient::new(&config.catalog).unwrap();
    let store = CartStore::new(storage, config.storage.key.clone());
    let service = CartService::load(client, store).await.unwrap();
    AppState::from_parts(config, service)
}

/// A running storefront wired to a fake catalog.
pub struct TestContext {
    pub catalog: FakeCatalog,
    pub state: AppState,
    pub client: reqwest::Client,
    addr: SocketAddr,
}

impl TestContext {
    /// Fresh catalog, in-memory storage.
    pub async fn new() -> Self {
        let catalog = FakeCatalog::spawn().await;
        Self::with_storage(catalog, Storage::Memory(MemoryStore::new())).await
    }

    /// Start a storefront over `catalog` and `storage`.
    pub async fn with_storage(catalog: FakeCatalog, storage: Storage) -> Self {
        let state = build_state(&catalog, storage).await;
        let addr = serve(routes::app(state.clone())).await;
        Self {
            catalog,
            state,
            client: reqwest::Client::new(),
            addr,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// The cart as currently persisted, if anything was written.
    pub async fn persisted_cart(&self) -> Option<Cart> {
        let store = self.state.cart().store();
        store
            .backend()
            .get(store.key())
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    /// The in-memory cart.
    pub async fn cart(&self) -> Cart {
        self.state.cart().cart().await
    }

    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> (u16, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap();
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}
