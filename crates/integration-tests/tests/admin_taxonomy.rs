//! Deleting categories and brands from the admin console.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use camrent_core::models::collections;
use camrent_firebase::{Datastore, MemoryDatastore};
use camrent_integration_tests::{get, post_form, put, send, signed_in_admin};
use serde_json::json;

async fn seeded() -> MemoryDatastore {
    let db = MemoryDatastore::new();
    put(&db, collections::CATEGORIES, "cameras", &json!({"name": "Cameras", "order": 0})).await;
    put(&db, collections::CATEGORIES, "drones", &json!({"name": "Drones", "order": 1})).await;
    put(&db, collections::BRANDS, "sony", &json!({"name": "Sony"})).await;
    put(&db, collections::BRANDS, "dji", &json!({"name": "DJI"})).await;
    put(
        &db,
        collections::PRODUCTS,
        "fx3",
        &json!({
            "name": "Sony FX3",
            "slug": "sony-fx3",
            "categoryId": "cameras",
            "brandId": "sony",
            "pricePerDay": 85
        }),
    )
    .await;
    db
}

#[tokio::test]
async fn test_category_with_products_is_kept() {
    let db = seeded().await;
    let (app, cookie) = signed_in_admin(&db).await;

    let response = send(&app, post_form("/categories/cameras/delete", &[], Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/categories"));
    assert!(db.get(collections::CATEGORIES, "cameras").await.unwrap().is_some());

    let page = send(&app, get("/categories", Some(&cookie))).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("flash-error"));
    assert!(page.body.contains("still has products"));
}

#[tokio::test]
async fn test_unused_category_is_deleted() {
    let db = seeded().await;
    let (app, cookie) = signed_in_admin(&db).await;

    let response = send(&app, post_form("/categories/drones/delete", &[], Some(&cookie))).await;
    assert_eq!(response.location(), Some("/categories"));
    assert!(db.get(collections::CATEGORIES, "drones").await.unwrap().is_none());
    assert_eq!(db.count(collections::CATEGORIES).await, 1);

    let page = send(&app, get("/categories", Some(&cookie))).await;
    assert!(page.body.contains("flash-success"));
    assert!(page.body.contains("deleted"));
}

#[tokio::test]
async fn test_brand_with_products_is_kept() {
    let db = seeded().await;
    let (app, cookie) = signed_in_admin(&db).await;

    let response = send(&app, post_form("/brands/sony/delete", &[], Some(&cookie))).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/brands"));
    assert!(db.get(collections::BRANDS, "sony").await.unwrap().is_some());

    let page = send(&app, get("/brands", Some(&cookie))).await;
    assert!(page.body.contains("flash-error"));
    assert!(page.body.contains("is still used by products"));
}

#[tokio::test]
async fn test_unused_brand_is_deleted() {
    let db = seeded().await;
    let (app, cookie) = signed_in_admin(&db).await;

    let response = send(&app, post_form("/brands/dji/delete", &[], Some(&cookie))).await;
    assert_eq!(response.location(), Some("/brands"));
    assert!(db.get(collections::BRANDS, "dji").await.unwrap().is_none());
    assert!(db.get(collections::BRANDS, "sony").await.unwrap().is_some());
}
