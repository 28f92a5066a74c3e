//! Admin console access control without a signed-in admin.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use camrent_core::models::collections;
use camrent_firebase::MemoryDatastore;
use camrent_integration_tests::{admin, get, post_form, put, send};
use serde_json::json;

#[tokio::test]
async fn test_pages_redirect_to_login() {
    let db = MemoryDatastore::new();
    let app = admin(&db);

    for path in ["/", "/products", "/categories", "/settings/redbar", "/contacts"] {
        let response = send(&app, get(path, None)).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{path}");
        assert_eq!(response.location(), Some("/auth/login"), "{path}");
    }
}

#[tokio::test]
async fn test_mutations_without_session_change_nothing() {
    let db = MemoryDatastore::new();
    put(&db, collections::CATEGORIES, "cameras", &json!({"name": "Cameras", "order": 1})).await;
    let app = admin(&db);

    let response = send(&app, post_form("/categories/cameras/delete", &[], None)).await;
    assert_eq!(response.location(), Some("/auth/login"));
    assert_eq!(db.count(collections::CATEGORIES).await, 1);

    let response = send(
        &app,
        post_form("/settings/redbar", &[("enabled", "on"), ("text", "Hacked")], None),
    )
    .await;
    assert_eq!(response.location(), Some("/auth/login"));
    assert_eq!(db.count(collections::SETTINGS).await, 0);
}

#[tokio::test]
async fn test_login_page_without_auth_backend() {
    let db = MemoryDatastore::new();
    let app = admin(&db);

    let page = send(&app, get("/auth/login", None)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("not configured"));
    let csp = page.headers.get("content-security-policy").unwrap().to_str().unwrap();
    assert!(csp.contains("frame-ancestors 'none'"));

    let attempt = send(
        &app,
        post_form("/auth/login", &[("email", "ops@camrent.test"), ("password", "x")], None),
    )
    .await;
    assert_eq!(attempt.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_checks() {
    let db = MemoryDatastore::new();
    let app = admin(&db);

    let health = send(&app, get("/health", None)).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, "ok");

    let ready = send(&app, get("/health/ready", None)).await;
    assert_eq!(ready.status, StatusCode::OK);
}
