//! Integration tests for Camrent.
//!
//! Most tests build the real storefront and admin routers over a
//! [`MemoryDatastore`] and drive them in-process with `tower::ServiceExt`.
//! Tests marked `#[ignore]` talk to running servers instead:
//!
//! ```bash
//! STOREFRONT_BASE_URL=http://localhost:3000 cargo test -p camrent-integration-tests -- --ignored
//! ```

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use camrent_admin::middleware::session::SESSION_COOKIE_NAME;
use camrent_admin::models::{CurrentAdmin, session_keys};
use camrent_core::UserId;
use camrent_core::models::{Role, UserProfile, collections};
use camrent_firebase::{Datastore, FirebaseConfig, MemoryDatastore, to_fields};
use camrent_storefront::config::StorefrontConfig;
use camrent_storefront::content::ContentStore;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session};
use url::Url;

/// Client address sent with every request, for the per-IP rate limiters.
pub const CLIENT_IP: &str = "203.0.113.10";

const PROJECT_ID: &str = "camrent-test";

fn secret() -> SecretString {
    SecretString::from("integration-test-session-secret-0123456789abcdef")
}

/// Storefront router over `db`, without Auth, Algolia or content pages.
///
/// # Panics
///
/// Never: the base URL is a constant.
#[must_use]
pub fn storefront(db: &MemoryDatastore) -> Router {
    let base_url = Url::parse("http://localhost:3000").expect("valid URL");
    let config = StorefrontConfig::local(base_url, FirebaseConfig::for_project(PROJECT_ID), secret());
    let db: Arc<dyn Datastore> = Arc::new(db.clone());
    let state = camrent_storefront::AppState::new(config, db, None, None, ContentStore::default());
    camrent_storefront::app(state)
}

/// Admin router over `db`, without Auth, Storage or Algolia.
#[must_use]
pub fn admin(db: &MemoryDatastore) -> Router {
    camrent_admin::app(admin_state(db))
}

/// Admin router with an admin already signed in.
///
/// Writes `users/{uid}` with the admin role and a session holding that user,
/// and returns the router with the matching `Cookie` header value.
///
/// # Panics
///
/// Panics if the session or user document cannot be written.
pub async fn signed_in_admin(db: &MemoryDatastore) -> (Router, String) {
    let admin = CurrentAdmin {
        uid: UserId::new("admin-1"),
        email: "ops@camrent.test".to_string(),
    };
    let profile = UserProfile {
        email: admin.email.clone(),
        role: Role::Admin,
        ..UserProfile::default()
    };
    let profile_fields = serde_json::to_value(&profile).expect("profile serializes");
    put(db, collections::USERS, admin.uid.as_str(), &profile_fields).await;

    let store = MemoryStore::default();
    let session = Session::new(None, Arc::new(store.clone()), None);
    session
        .insert(session_keys::CURRENT_ADMIN, admin)
        .await
        .expect("session insert");
    session.save().await.expect("session save");
    let id = session.id().expect("saved session has an ID");

    let app = camrent_admin::app_with_sessions(admin_state(db), store);
    (app, format!("{SESSION_COOKIE_NAME}={id}"))
}

fn admin_state(db: &MemoryDatastore) -> camrent_admin::AppState {
    let base_url = Url::parse("http://localhost:3001").expect("valid URL");
    let config = camrent_admin::config::AdminConfig::local(
        base_url,
        FirebaseConfig::for_project(PROJECT_ID),
        secret(),
    );
    let db: Arc<dyn Datastore> = Arc::new(db.clone());
    camrent_admin::AppState::new(config, db, None, None, None)
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// `name=value` of the first `Set-Cookie`, ready for a `Cookie` header.
    #[must_use]
    pub fn cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(ToString::to_string)
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Send one request through a clone of `app`. Clones share the session store.
///
/// # Panics
///
/// Panics if the router fails or the body cannot be read.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// `GET uri`, with an optional session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri).header("x-forwarded-for", CLIENT_IP);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// URL-encoded form `POST`, with an optional session cookie.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn post_form(uri: &str, fields: &[(&str, &str)], cookie: Option<&str>) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", CLIENT_IP);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("valid request")
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Write a document from JSON.
///
/// # Panics
///
/// Panics if `fields` is not an object or the write fails.
pub async fn put(db: &MemoryDatastore, collection: &str, id: &str, fields: &Value) {
    db.set(collection, id, to_fields(fields).expect("JSON object"))
        .await
        .expect("memory write");
}
