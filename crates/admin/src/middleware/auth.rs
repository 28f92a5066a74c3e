//! Authentication extractor for admin routes.
//!
//! A session alone is not enough: the admin role is re-read from
//! `users/{uid}` on every request, so revoking it takes effect immediately.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::models::{UserProfile, collections};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/auth/login";

/// Extractor that requires a signed-in user holding the admin role.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.email)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Why an admin request was turned away.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// No admin in the session, or the role was revoked.
    RedirectToLogin,
    /// The session layer is missing.
    Unauthorized,
    /// The role could not be checked.
    Unavailable,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AdminAuthRejection::Unauthorized)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminAuthRejection::RedirectToLogin)?;

        let profile: Option<UserProfile> = state
            .db()
            .fetch(collections::USERS, admin.uid.as_str())
            .await
            .map_err(|e| {
                tracing::error!(uid = %admin.uid, error = %e, "Failed to check admin role");
                AdminAuthRejection::Unavailable
            })?;

        if !profile.is_some_and(|p| p.is_admin()) {
            tracing::warn!(uid = %admin.uid, "Admin role revoked, ending session");
            let _ = session.flush().await;
            return Err(AdminAuthRejection::RedirectToLogin);
        }

        Ok(Self(admin))
    }
}

/// Store the admin in a fresh session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// End the admin session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
