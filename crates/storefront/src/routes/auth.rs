//! Sign-in, registration, sign-out and password reset.
//!
//! Credentials are checked by Firebase Authentication. On success the
//! storefront keeps only the user ID and email in its own session and folds
//! the guest cart into `users/{uid}.cart`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::Email;
use camrent_firebase::{AuthError, SignedIn};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, Flash};
use crate::services::{cart, users};
use crate::state::AppState;

/// Firebase rejects shorter passwords with `WEAK_PASSWORD`.
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetForm {
    pub email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub error: Option<String>,
    pub available: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub email: String,
    pub display_name: String,
    pub error: Option<String>,
    pub available: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/reset.html")]
pub struct ResetTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
    pub sent: bool,
}

/// User-facing auth failures become form errors; the rest are server errors.
fn form_error(err: AuthError) -> Result<String> {
    if err.is_user_facing() {
        Ok(match err {
            // Do not reveal which half of the credentials was wrong.
            AuthError::EmailNotFound | AuthError::InvalidPassword => {
                AuthError::InvalidCredentials.to_string()
            }
            other => other.to_string(),
        })
    } else {
        Err(err.into())
    }
}

/// Store the customer in the session, make sure a profile exists and merge
/// the guest cart.
async fn start_session(state: &AppState, session: &Session, signed_in: &SignedIn) -> Result<()> {
    let customer = CurrentCustomer {
        uid: signed_in.uid.clone(),
        email: signed_in.email.clone(),
    };
    set_current_customer(session, &customer).await?;
    set_sentry_user(&customer.uid, Some(&customer.email));

    if users::load_profile(state.db(), &customer.uid).await?.is_none() {
        users::create_profile(state.db(), &customer.uid, &customer.email, None).await?;
    }
    cart::merge_guest_into_account(state.db(), session, &customer.uid).await?;
    Ok(())
}

pub async fn login_page(State(state): State<AppState>, ctx: PageContext) -> Response {
    if ctx.signed_in() {
        return Redirect::to("/account/favorites").into_response();
    }
    LoginTemplate {
        ctx,
        email: String::new(),
        error: None,
        available: state.auth().is_some(),
    }
    .into_response()
}

#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let auth = state.auth().ok_or(AuthError::NotConfigured)?;
    let email = form.email.trim();

    match auth.sign_in_with_password(email, &form.password).await {
        Ok(signed_in) => {
            start_session(&state, &session, &signed_in).await?;
            info!(uid = %signed_in.uid, "Customer signed in");
            Flash::success("Welcome back!").set(&session).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(err) => {
            warn!(error = %err, "Sign-in failed");
            let status = if matches!(err, AuthError::TooManyAttempts) {
                StatusCode::TOO_MANY_REQUESTS
            } else {
                StatusCode::UNAUTHORIZED
            };
            let error = form_error(err)?;
            Ok((
                status,
                LoginTemplate {
                    ctx,
                    email: email.to_string(),
                    error: Some(error),
                    available: true,
                },
            )
                .into_response())
        }
    }
}

pub async fn register_page(State(state): State<AppState>, ctx: PageContext) -> Response {
    if ctx.signed_in() {
        return Redirect::to("/account/favorites").into_response();
    }
    RegisterTemplate {
        ctx,
        email: String::new(),
        display_name: String::new(),
        error: None,
        available: state.auth().is_some(),
    }
    .into_response()
}

fn validate_registration(form: &RegisterForm) -> std::result::Result<Email, String> {
    let email = Email::parse(&form.email).map_err(|e| e.to_string())?;
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    if form.password != form.password_confirm {
        return Err("Passwords do not match".to_string());
    }
    Ok(email)
}

#[instrument(skip(state, session, ctx, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let auth = state.auth().ok_or(AuthError::NotConfigured)?;
    let display_name = form.display_name.trim().to_string();

    let rejected = |ctx: PageContext, error: String| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            RegisterTemplate {
                ctx,
                email: form.email.trim().to_string(),
                display_name: display_name.clone(),
                error: Some(error),
                available: true,
            },
        )
            .into_response()
    };

    let email = match validate_registration(&form) {
        Ok(email) => email,
        Err(error) => return Ok(rejected(ctx, error)),
    };

    let signed_in = match auth.sign_up(email.as_str(), &form.password).await {
        Ok(signed_in) => signed_in,
        Err(err) => {
            warn!(error = %err, "Registration failed");
            let error = form_error(err)?;
            return Ok(rejected(ctx, error));
        }
    };

    users::create_profile(
        state.db(),
        &signed_in.uid,
        email.as_str(),
        (!display_name.is_empty()).then(|| display_name.clone()),
    )
    .await?;
    start_session(&state, &session, &signed_in).await?;
    info!(uid = %signed_in.uid, "Customer registered");

    Flash::success("Your account is ready.").set(&session).await;
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/"))
}

pub async fn reset_page(ctx: PageContext) -> ResetTemplate {
    ResetTemplate {
        ctx,
        error: None,
        sent: false,
    }
}

/// Send a reset email.
///
/// The page reports success for unknown addresses too, so the form cannot
/// be used to discover accounts.
#[instrument(skip(state, ctx, form))]
pub async fn reset(
    State(state): State<AppState>,
    ctx: PageContext,
    Form(form): Form<ResetForm>,
) -> Result<Response> {
    let auth = state.auth().ok_or(AuthError::NotConfigured)?;
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ResetTemplate {
                    ctx,
                    error: Some(e.to_string()),
                    sent: false,
                },
            )
                .into_response());
        }
    };

    match auth.send_password_reset(email.as_str()).await {
        Ok(()) | Err(AuthError::EmailNotFound) => {}
        Err(err) => return Err(err.into()),
    }

    Ok(ResetTemplate {
        ctx,
        error: None,
        sent: true,
    }
    .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_string(),
            password: password.to_string(),
            password_confirm: confirm.to_string(),
            display_name: String::new(),
        }
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&form("ada@example.com", "secret1", "secret1")).is_ok());
        assert!(validate_registration(&form("not-an-email", "secret1", "secret1")).is_err());
        assert_eq!(
            validate_registration(&form("ada@example.com", "abc", "abc")).unwrap_err(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            validate_registration(&form("ada@example.com", "secret1", "secret2")).unwrap_err(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_form_error_hides_which_credential_failed() {
        assert_eq!(
            form_error(AuthError::EmailNotFound).ok().unwrap_or_default(),
            "Invalid email or password"
        );
        assert!(form_error(AuthError::Api("INTERNAL".to_string())).is_err());
    }
}
