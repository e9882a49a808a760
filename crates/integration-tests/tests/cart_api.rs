//! Integration tests for the JSON cart API.
//!
//! Each test runs the storefront router against the fake catalog and checks
//! both the response and what ended up in storage.

use serde_json::json;
use storefront_cart::storage::{FileStore, Storage};
use storefront_cart_core::ProductId;
use storefront_cart_integration_tests::{FakeCatalog, TestContext};

async fn context_with_sneakers() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.catalog.add_product(1, "Running sneaker", 17990, 3);
    ctx.catalog.add_product(2, "Court sneaker", 13990, 1);
    ctx
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_new_product_with_stock_has_quantity_one() {
    let ctx = context_with_sneakers().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["id"], 1);
    assert_eq!(body["cart"]["items"][0]["amount"], 1);
    assert_eq!(body["cart"]["items"][0]["title"], "Running sneaker");
    assert_eq!(body["notification"]["level"], "success");
    assert_eq!(ctx.persisted_cart().await.unwrap(), ctx.cart().await);
}

#[tokio::test]
async fn test_add_existing_product_increments() {
    let ctx = context_with_sneakers().await;

    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["amount"], 2);
    assert_eq!(body["cart"]["item_count"], 2);
    assert_eq!(body["cart"]["subtotal"], "$359.80");
    assert_eq!(ctx.catalog.stock_requests(), 2);
    assert_eq!(ctx.catalog.product_requests(), 1);
    assert_eq!(ctx.persisted_cart().await.unwrap(), ctx.cart().await);
}

#[tokio::test]
async fn test_add_beyond_stock_leaves_cart_unchanged() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;
    let before = ctx.cart().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;

    assert_eq!(status, 409);
    assert_eq!(body["notification"]["level"], "error");
    assert_eq!(
        body["notification"]["message"],
        "Requested quantity is out of stock"
    );
    assert_eq!(body["cart"]["items"][0]["amount"], 1);
    assert_eq!(ctx.cart().await, before);
    assert_eq!(ctx.persisted_cart().await.unwrap(), before);
}

#[tokio::test]
async fn test_add_unknown_product_reports_generic_error() {
    let ctx = context_with_sneakers().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 99 }))
        .await;

    assert_eq!(status, 502);
    assert_eq!(body["notification"]["message"], "Error adding product");
    assert!(ctx.cart().await.is_empty());
    assert!(ctx.persisted_cart().await.is_none());
}

#[tokio::test]
async fn test_catalog_outage_reports_generic_error() {
    let ctx = context_with_sneakers().await;
    ctx.catalog.set_offline(true);

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;

    assert_eq!(status, 502);
    assert_eq!(body["notification"]["message"], "Error adding product");
    assert!(ctx.cart().await.is_empty());
}

#[tokio::test]
async fn test_stock_is_fetched_fresh_each_time() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;

    ctx.catalog.set_stock(2, 2);
    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["amount"], 2);
}

// =============================================================================
// Remove
// =============================================================================

#[tokio::test]
async fn test_remove_product() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;

    let (status, body) = ctx
        .post_json("/api/cart/remove", &json!({ "product_id": 1 }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"]["items"][0]["id"], 2);
    assert_eq!(ctx.persisted_cart().await.unwrap(), ctx.cart().await);
}

#[tokio::test]
async fn test_remove_missing_product_signals_error() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    let before = ctx.cart().await;

    let (status, body) = ctx
        .post_json("/api/cart/remove", &json!({ "product_id": 2 }))
        .await;

    assert_eq!(status, 404);
    assert_eq!(body["notification"]["message"], "Error removing product");
    assert_eq!(ctx.cart().await, before);
}

// =============================================================================
// Update amount
// =============================================================================

#[tokio::test]
async fn test_update_amount() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "product_id": 1, "amount": 3 }),
        )
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["amount"], 3);
    assert_eq!(ctx.persisted_cart().await.unwrap(), ctx.cart().await);
}

#[tokio::test]
async fn test_update_amount_zero_or_negative_is_rejected() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    let before = ctx.cart().await;

    for amount in [0, -2] {
        let (status, body) = ctx
            .post_json(
                "/api/cart/update",
                &json!({ "product_id": 1, "amount": amount }),
            )
            .await;

        assert_eq!(status, 422);
        assert_eq!(
            body["notification"]["message"],
            "Error changing product quantity"
        );
    }

    assert_eq!(ctx.cart().await, before);
    assert_eq!(ctx.persisted_cart().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_amount_above_stock_is_rejected() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    let before = ctx.cart().await;

    let (status, body) = ctx
        .post_json(
            "/api/cart/update",
            &json!({ "product_id": 1, "amount": 4 }),
        )
        .await;

    assert_eq!(status, 409);
    assert_eq!(
        body["notification"]["message"],
        "Requested quantity is out of stock"
    );
    assert_eq!(ctx.cart().await, before);
}

// =============================================================================
// Read endpoints, clear, malformed input
// =============================================================================

#[tokio::test]
async fn test_count_item_and_clear() {
    let ctx = context_with_sneakers().await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    ctx.post_json("/api/cart/add", &json!({ "product_id": 2 }))
        .await;

    let (status, body) = ctx.get_json("/api/cart/count").await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 3);

    let (status, body) = ctx.get_json("/api/cart/items/1").await;
    assert_eq!(status, 200);
    assert_eq!(body["amount"], 2);
    assert_eq!(body["line_total"], "$359.80");

    let (status, body) = ctx.post_json("/api/cart/clear", &json!({})).await;
    assert_eq!(status, 200);
    assert!(body["cart"]["items"].as_array().unwrap().is_empty());
    assert!(ctx.persisted_cart().await.unwrap().is_empty());

    let response = ctx
        .client
        .get(ctx.url("/api/cart/items/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let ctx = context_with_sneakers().await;

    let response = ctx
        .client
        .post(ctx.url("/api/cart/add"))
        .header("content-type", "application/json")
        .body("{\"product_id\": \"one\"}")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert!(ctx.cart().await.is_empty());
}

// =============================================================================
// Persistence across restarts
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.json");
    let catalog = FakeCatalog::spawn().await;
    catalog.add_product(1, "Running sneaker", 17990, 5);

    let first =
        TestContext::with_storage(catalog.clone(), Storage::File(FileStore::new(&path))).await;
    first
        .post_json("/api/cart/add", &json!({ "product_id": 1 }))
        .await;
    first
        .post_json(
            "/api/cart/update",
            &json!({ "product_id": 1, "amount": 4 }),
        )
        .await;

    let second = TestContext::with_storage(catalog, Storage::File(FileStore::new(&path))).await;
    let (status, body) = second.get_json("/api/cart").await;

    assert_eq!(status, 200);
    assert_eq!(body["cart"]["items"][0]["amount"], 4);
    assert_eq!(second.cart().await.quantity_of(ProductId::new(1)), 4);
}
