//! Guest cart kept in the session across requests.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use camrent_core::models::collections;
use camrent_firebase::MemoryDatastore;
use camrent_integration_tests::{get, post_form, put, send, storefront};
use serde_json::json;

async fn catalog() -> MemoryDatastore {
    let db = MemoryDatastore::new();
    put(
        &db,
        collections::CATEGORIES,
        "cameras",
        &json!({"name": "Cameras", "slug": "cameras", "order": 1}),
    )
    .await;
    put(
        &db,
        collections::PRODUCTS,
        "fx3",
        &json!({
            "name": "Sony FX3",
            "slug": "sony-fx3",
            "categoryId": "cameras",
            "pricePerDay": 85,
            "inStock": true
        }),
    )
    .await;
    db
}

#[tokio::test]
async fn test_guest_cart_survives_requests() {
    let db = catalog().await;
    let app = storefront(&db);

    let added = send(
        &app,
        post_form("/cart/add", &[("product_id", "fx3"), ("quantity", "2"), ("days", "3")], None),
    )
    .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location(), Some("/cart"));
    let cookie = added.cookie().unwrap();

    let count = send(&app, get("/cart/count", Some(&cookie))).await;
    assert!(count.body.contains(r#"<span class="badge">2</span>"#));

    let cart = send(&app, get("/cart", Some(&cookie))).await;
    assert_eq!(cart.status, StatusCode::OK);
    assert!(cart.body.contains("Sony FX3"));

    // Without the cookie the cart is empty.
    let anonymous = send(&app, get("/cart/count", None)).await;
    assert!(!anonymous.body.contains("badge"));
}

#[tokio::test]
async fn test_unknown_product_is_rejected() {
    let db = catalog().await;
    let app = storefront(&db);

    let response = send(&app, post_form("/cart/add", &[("product_id", "nope")], None)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
