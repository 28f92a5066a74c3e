//! Contact form submissions end to end: form post, Firestore document,
//! flash message on the redirected page.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use camrent_core::models::{ContactSubmission, collections};
use camrent_firebase::{Datastore, MemoryDatastore, Query};
use camrent_integration_tests::{get, post_form, send, storefront};

#[tokio::test]
async fn test_invalid_email_stores_nothing() {
    let db = MemoryDatastore::new();
    let app = storefront(&db);

    let response = send(
        &app,
        post_form(
            "/contact",
            &[
                ("name", "Dana"),
                ("email", "dana-at-example"),
                ("message", "Is the FX3 free this weekend?"),
            ],
            None,
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Dana"), "form is re-rendered with input");
    assert_eq!(db.count(collections::CONTACT_SUBMISSIONS).await, 0);
}

#[tokio::test]
async fn test_valid_submission_is_stored_unhandled() {
    let db = MemoryDatastore::new();
    let app = storefront(&db);

    let response = send(
        &app,
        post_form(
            "/contact",
            &[
                ("name", "Dana Levi"),
                ("email", "Dana@Example.com"),
                ("phone", "+972 50-000-0000"),
                ("message", "Is the FX3 free this weekend?"),
            ],
            None,
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/contact"));

    let db_dyn: &dyn Datastore = &db;
    let stored: Vec<ContactSubmission> = db_dyn
        .fetch_all(&Query::collection(collections::CONTACT_SUBMISSIONS))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].handled);
    assert_eq!(stored[0].name, "Dana Levi");
    assert_eq!(stored[0].email.as_str(), "dana@example.com");

    let cookie = response.cookie().unwrap();
    let page = send(&app, get("/contact", Some(&cookie))).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Thanks!"));
}
