//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};
use camrent_core::models::collections;

use crate::state::AppState;

/// The process is up. Does not touch dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Firestore answers a single-document read.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state
        .db()
        .get(collections::SETTINGS, collections::settings::FOOTER)
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
