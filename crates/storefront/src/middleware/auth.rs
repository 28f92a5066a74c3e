//! Customer authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

pub const LOGIN_PATH: &str = "/auth/login";

/// Requires a signed-in customer.
///
/// Page requests are redirected to the login page; htmx requests get an
/// `HX-Redirect` so the whole page navigates instead of swapping a fragment.
///
/// ```rust,ignore
/// async fn favorites(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

pub enum AuthRejection {
    RedirectToLogin,
    HtmxRedirectToLogin,
    /// No session layer on the route.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::HtmxRedirectToLogin => (
                StatusCode::UNAUTHORIZED,
                [("HX-Redirect", HeaderValue::from_static(LOGIN_PATH))],
            )
                .into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Whether the request was issued by htmx.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

async fn current_customer(parts: &Parts) -> Option<CurrentCustomer> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }
        match current_customer(parts).await {
            Some(customer) => Ok(Self(customer)),
            None if is_htmx(&parts.headers) => Err(AuthRejection::HtmxRedirectToLogin),
            None => Err(AuthRejection::RedirectToLogin),
        }
    }
}

/// The signed-in customer, if any.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_customer(parts).await))
    }
}

/// Store the signed-in customer, rotating the session ID first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Sign out. The guest cart is dropped along with the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use camrent_core::UserId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn customer() -> CurrentCustomer {
        CurrentCustomer {
            uid: UserId::new("uid-1"),
            email: "ada@example.com".to_string(),
        }
    }

    fn parts_with(session: Session, htmx: bool) -> Parts {
        let mut builder = Request::builder().uri("/account/favorites");
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        parts.extensions.insert(session);
        parts
    }

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_require_auth_redirects_anonymous_visitors() {
        let mut parts = parts_with(session(), false);
        let rejection = RequireAuth::from_request_parts(&mut parts, &()).await.err().unwrap();
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_require_auth_uses_hx_redirect_for_htmx() {
        let mut parts = parts_with(session(), true);
        let response = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap()
            .into_response();
        assert_eq!(response.headers()["hx-redirect"], LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_signed_in_customer_is_extracted() {
        let session = session();
        set_current_customer(&session, &customer()).await.unwrap();

        let mut parts = parts_with(session.clone(), false);
        let RequireAuth(found) = RequireAuth::from_request_parts(&mut parts, &()).await.ok().unwrap();
        assert_eq!(found, customer());

        clear_current_customer(&session).await.unwrap();
        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }
}
