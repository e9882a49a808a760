//! JSON cart API.
//!
//! Successful mutations answer 200 with the new cart and a success toast.
//! Failures answer with a non-2xx status, the unchanged cart and an error
//! toast (see [`AppError`]).

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use storefront_cart_core::{Cart, ProductId};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::notifications::{Notification, success_message};
use crate::routes::cart::{CartItemView, CartPayload, CartView};
use crate::services::{CartOperation, ServiceError, UpdateProductAmount};
use crate::state::AppState;

/// Body for add / remove.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Unwrap a JSON body, turning extractor rejections into `BadRequest`.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

async fn respond(
    state: &AppState,
    operation: CartOperation,
    outcome: std::result::Result<Cart, ServiceError>,
) -> Result<Json<CartPayload>> {
    match outcome {
        Ok(cart) => Ok(Json(CartPayload {
            cart: CartView::from(&cart),
            notification: Some(Notification::success(success_message(operation))),
        })),
        Err(source) => Err(AppError::cart_operation(
            operation,
            source,
            state.cart().cart().await,
        )),
    }
}

/// Current cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartPayload> {
    let cart = state.cart().cart().await;
    Json(CartPayload {
        cart: CartView::from(&cart),
        notification: None,
    })
}

/// A single cart line.
#[instrument(skip(state))]
pub async fn item(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartItemView>> {
    state
        .cart()
        .cart()
        .await
        .get(product_id)
        .map(|item| Json(CartItemView::from(item)))
        .ok_or_else(|| AppError::NotFound(format!("product {product_id} is not in the cart")))
}

/// Total units in the cart.
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount {
        count: state.cart().cart().await.item_count(),
    })
}

/// Add one unit of a product.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<CartPayload>> {
    let request = body(payload)?;
    add_breadcrumb(CartOperation::Add, Some(&request.product_id.to_string()));
    let outcome = state.cart().add_product(request.product_id).await;
    respond(&state, CartOperation::Add, outcome).await
}

/// Set a product's quantity.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateProductAmount>, JsonRejection>,
) -> Result<Json<CartPayload>> {
    let update = body(payload)?;
    add_breadcrumb(
        CartOperation::UpdateAmount,
        Some(&update.product_id.to_string()),
    );
    let outcome = state.cart().update_product_amount(update).await;
    respond(&state, CartOperation::UpdateAmount, outcome).await
}

/// Remove a product.
#[instrument(skip(state, payload))]
pub async fn remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<CartPayload>> {
    let request = body(payload)?;
    add_breadcrumb(CartOperation::Remove, Some(&request.product_id.to_string()));
    let outcome = state.cart().remove_product(request.product_id).await;
    respond(&state, CartOperation::Remove, outcome).await
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartPayload>> {
    add_breadcrumb(CartOperation::Clear, None);
    let outcome = state.cart().clear().await;
    respond(&state, CartOperation::Clear, outcome).await
}
