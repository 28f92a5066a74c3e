//! Admin sign-in and sign-out.
//!
//! Credentials are checked by Firebase Authentication; access additionally
//! requires `users/{uid}.role == "admin"`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::models::{UserProfile, collections};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub flash: Option<Flash>,
    pub available: bool,
}

fn login_failed(status: StatusCode, email: String, message: &str) -> Response {
    let page = LoginTemplate {
        email,
        error: Some(message.to_string()),
        flash: None,
        available: true,
    };
    (status, page).into_response()
}

/// Login page.
pub async fn login_page(State(state): State<AppState>, session: Session) -> LoginTemplate {
    LoginTemplate {
        email: String::new(),
        error: None,
        flash: Flash::take(&session).await,
        available: state.auth().is_some(),
    }
}

/// Check credentials and the admin role, then start the session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Some(auth) = state.auth() else {
        return Ok(login_failed(
            StatusCode::SERVICE_UNAVAILABLE,
            form.email,
            "Sign-in is not configured",
        ));
    };

    let signed_in = match auth.sign_in_with_password(form.email.trim(), &form.password).await {
        Ok(signed_in) => signed_in,
        Err(e) if e.is_user_facing() => {
            warn!(error = %e, "Admin sign-in rejected");
            return Ok(login_failed(
                StatusCode::UNAUTHORIZED,
                form.email,
                "Invalid email or password",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let profile: Option<UserProfile> = state
        .db()
        .fetch(collections::USERS, signed_in.uid.as_str())
        .await?;
    if !profile.is_some_and(|p| p.is_admin()) {
        warn!(uid = %signed_in.uid, "Sign-in without admin role");
        return Ok(login_failed(
            StatusCode::FORBIDDEN,
            form.email,
            "This account does not have admin access",
        ));
    }

    let admin = CurrentAdmin {
        uid: signed_in.uid,
        email: signed_in.email,
    };
    set_current_admin(&session, &admin).await?;
    set_sentry_user(admin.uid.as_str(), &admin.email);
    info!(uid = %admin.uid, "Admin signed in");

    Ok(Redirect::to("/").into_response())
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Flash::success("Signed out").set(&session).await;
    Ok(Redirect::to("/auth/login"))
}
