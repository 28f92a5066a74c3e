//! Site settings and category order as the storefront renders them.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use camrent_core::models::{Category, collections};
use camrent_core::ordering::{self, Direction};
use camrent_core::CategoryId;
use camrent_firebase::{Datastore, MemoryDatastore, Query, Write, to_fields};
use camrent_integration_tests::{get, put, send, storefront};
use serde_json::json;

#[tokio::test]
async fn test_missing_settings_render_defaults() {
    let db = MemoryDatastore::new();
    let app = storefront(&db);

    let home = send(&app, get("/", None)).await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(!home.body.contains(r#"class="red-bar""#));
    assert!(!home.body.contains(r#"id="popup""#));
}

#[tokio::test]
async fn test_enabled_red_bar_and_popup_render() {
    let db = MemoryDatastore::new();
    put(
        &db,
        collections::SETTINGS,
        collections::settings::REDBAR,
        &json!({"enabled": true, "text": "Free delivery this week", "link": "/products"}),
    )
    .await;
    put(
        &db,
        collections::SETTINGS,
        collections::settings::POPUP,
        &json!({"enabled": true, "delaySeconds": 7}),
    )
    .await;
    let app = storefront(&db);

    let home = send(&app, get("/", None)).await;
    assert!(home.body.contains("Free delivery this week"));
    assert!(home.body.contains("load delay:7s"));
}

#[tokio::test]
async fn test_category_move_changes_navigation_order() {
    let db = MemoryDatastore::new();
    put(&db, collections::CATEGORIES, "cameras", &json!({"name": "Cameras", "slug": "cameras", "order": 1})).await;
    put(&db, collections::CATEGORIES, "lenses", &json!({"name": "Lenses", "slug": "lenses", "order": 2})).await;

    let db_dyn: &dyn Datastore = &db;
    let categories: Vec<Category> = db_dyn
        .fetch_all(&Query::collection(collections::CATEGORIES))
        .await
        .unwrap();
    let swap = ordering::plan_move(&categories, &CategoryId::new("lenses"), Direction::Up).unwrap();
    let writes = [swap.first, swap.second]
        .into_iter()
        .map(|(id, order)| {
            Write::update(
                collections::CATEGORIES,
                id.as_str(),
                to_fields(&json!({ "order": order })).unwrap(),
            )
        })
        .collect();
    db.commit(writes).await.unwrap();

    let app = storefront(&db);
    let home = send(&app, get("/", None)).await;
    let lenses = home.body.find("/categories/lenses").unwrap();
    let cameras = home.body.find("/categories/cameras").unwrap();
    assert!(lenses < cameras);
}
