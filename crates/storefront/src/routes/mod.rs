//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the cart page
//! GET  /health                 - Health check
//!
//! # Cart page (HTML forms, re-renders the page with a toast)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit
//! POST /cart/update            - Set quantity
//! POST /cart/remove            - Remove product
//! POST /cart/clear             - Empty cart
//!
//! # Cart API (JSON)
//! GET  /api/cart               - Cart
//! GET  /api/cart/count         - Total units
//! GET  /api/cart/items/{id}    - Single line
//! POST /api/cart/add           - {"product_id"}
//! POST /api/cart/update        - {"product_id", "amount"}
//! POST /api/cart/remove        - {"product_id"}
//! POST /api/cart/clear
//! ```

pub mod api;
pub mod cart;

use axum::{
    Router,
    http::Request,
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the cart page routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the JSON cart API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(api::show))
        .route("/count", get(api::count))
        .route("/items/{product_id}", get(api::item))
        .route("/add", post(api::add))
        .route("/update", post(api::update))
        .route("/remove", post(api::remove))
        .route("/clear", post(api::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/cart") }))
        .nest("/cart", cart_routes())
        .nest("/api/cart", api_routes())
}

/// Build the full application: routes, health check, tracing and request IDs.
///
/// Sentry layers are added by the binary so tests can use this router as-is.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
