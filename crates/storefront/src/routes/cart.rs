//! Cart page route handlers.
//!
//! Plain HTML forms: every action re-renders the cart page with a toast
//! describing the outcome. Failures never turn into error pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
};
use serde::{Deserialize, Serialize};
use storefront_cart_core::{Cart, CartItem, Price, ProductId};
use tracing::{info, instrument};

use crate::error::add_breadcrumb;
use crate::notifications::{Notification, failure_message, notify};
use crate::services::{CartOperation, ServiceError, UpdateProductAmount};
use crate::state::AppState;

/// Cart line display data for templates and JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub price: String,
    pub amount: u32,
    pub line_total: String,
}

/// Cart display data for templates and JSON.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

/// Cart plus the toast for the last operation.
#[derive(Debug, Clone, Serialize)]
pub struct CartPayload {
    pub cart: CartView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Shown in place of a total that does not fit a price.
pub const TOTAL_UNAVAILABLE: &str = "Price unavailable";

fn format_total(total: Option<Price>) -> String {
    total.map_or_else(|| TOTAL_UNAVAILABLE.to_string(), |price| price.to_string())
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id().as_i64(),
            title: item.product.title.clone(),
            image: item.product.image.clone(),
            price: item.product.price.to_string(),
            amount: item.amount,
            line_total: format_total(item.line_total()),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_total(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }
}

/// Add / remove form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateAmountForm {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub store_name: String,
    pub cart: CartView,
    pub notification: Option<Notification>,
}

/// Render the cart page after `operation`.
///
/// On failure the current (unchanged) cart is shown with the error toast.
async fn render_outcome(
    state: &AppState,
    operation: CartOperation,
    outcome: Result<Cart, ServiceError>,
) -> CartShowTemplate {
    let notification = notify(operation, &outcome);
    let cart = match outcome {
        Ok(cart) => cart,
        Err(_) => state.cart().cart().await,
    };

    CartShowTemplate {
        store_name: state.config().store_name.clone(),
        cart: CartView::from(&cart),
        notification: Some(notification),
    }
}

/// Render the cart page for a form that could not be read.
///
/// The cart is untouched; the shopper sees the operation's failure toast.
async fn render_rejected(
    state: &AppState,
    operation: CartOperation,
    rejection: &FormRejection,
) -> CartShowTemplate {
    info!(
        operation = operation.as_str(),
        error = %rejection.body_text(),
        "Rejected cart form"
    );
    let cart = state.cart().cart().await;

    CartShowTemplate {
        store_name: state.config().store_name.clone(),
        cart: CartView::from(&cart),
        notification: Some(Notification::error(failure_message(operation))),
    }
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> CartShowTemplate {
    let cart = state.cart().cart().await;
    CartShowTemplate {
        store_name: state.config().store_name.clone(),
        cart: CartView::from(&cart),
        notification: None,
    }
}

/// Add one unit of a product.
#[instrument(skip(state, form))]
pub async fn add(
    State(state): State<AppState>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> CartShowTemplate {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return render_rejected(&state, CartOperation::Add, &rejection).await,
    };
    add_breadcrumb(CartOperation::Add, Some(&form.product_id.to_string()));
    let outcome = state.cart().add_product(form.product_id).await;
    render_outcome(&state, CartOperation::Add, outcome).await
}

/// Set a product's quantity.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    form: Result<Form<UpdateAmountForm>, FormRejection>,
) -> CartShowTemplate {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            return render_rejected(&state, CartOperation::UpdateAmount, &rejection).await;
        }
    };
    add_breadcrumb(CartOperation::UpdateAmount, Some(&form.product_id.to_string()));
    let outcome = state
        .cart()
        .update_product_amount(UpdateProductAmount {
            product_id: form.product_id,
            amount: form.amount,
        })
        .await;
    render_outcome(&state, CartOperation::UpdateAmount, outcome).await
}

/// Remove a product.
#[instrument(skip(state, form))]
pub async fn remove(
    State(state): State<AppState>,
    form: Result<Form<ProductForm>, FormRejection>,
) -> CartShowTemplate {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return render_rejected(&state, CartOperation::Remove, &rejection).await,
    };
    add_breadcrumb(CartOperation::Remove, Some(&form.product_id.to_string()));
    let outcome = state.cart().remove_product(form.product_id).await;
    render_outcome(&state, CartOperation::Remove, outcome).await
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> CartShowTemplate {
    add_breadcrumb(CartOperation::Clear, None);
    let outcome = state.cart().clear().await;
    render_outcome(&state, CartOperation::Clear, outcome).await
}
