//! Liveness and readiness probes.

use axum::{extract::State, http::StatusCode};
use camrent_core::models::collections;

use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// Firestore is reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state
        .db()
        .get(collections::SETTINGS, collections::settings::REDBAR)
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
