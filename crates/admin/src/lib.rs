//! Camrent Admin library.
//!
//! The internal catalog and site-settings console as a library, so the
//! router can be built in-process by tests and the binary alike.
//!
//! # Security
//!
//! Every page except sign-in and health checks requires a Firebase account
//! whose `users/{uid}` document carries the `admin` role. The role is checked
//! on each request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::MemoryStore;
use tracing::Span;

pub use state::AppState;

/// Static assets, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/admin/static";

/// Largest accepted request body: a product form with several full-size
/// images.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Build the admin router with its middleware stack.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    app_with_sessions(state, MemoryStore::default())
}

/// Build the admin router over an existing session store.
///
/// Sessions written to `store` are visible to the router, which lets tests
/// start from a signed-in admin without Firebase Authentication.
pub fn app_with_sessions(state: AppState, store: MemoryStore) -> Router {
    let session_layer = middleware::create_session_layer(state.config(), store);

    Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
