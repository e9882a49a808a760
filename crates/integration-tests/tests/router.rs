//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use storefront_cart::middleware::REQUEST_ID_HEADER;
use storefront_cart::routes;
use storefront_cart::storage::{MemoryStore, Storage};
use storefront_cart_integration_tests::{FakeCatalog, build_state};
use tower::ServiceExt;

async fn app() -> axum::Router {
    let catalog = FakeCatalog::spawn().await;
    let state = build_state(&catalog, Storage::Memory(MemoryStore::new())).await;
    routes::app(state)
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .await
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let response = app()
        .await
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let response = app()
        .await
        .oneshot(
            Request::get("/api/cart")
                .header(REQUEST_ID_HEADER, "edge-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "edge-42");
}

#[tokio::test]
async fn test_root_redirects_to_cart() {
    let response = app()
        .await
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get("location").unwrap(), "/cart");
}
