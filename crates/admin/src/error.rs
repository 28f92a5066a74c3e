//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use camrent_firebase::{AlgoliaError, AuthError, FirebaseError, StorageError};
use thiserror::Error;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Firestore read or write failed.
    #[error("Datastore error: {0}")]
    Datastore(#[from] FirebaseError),

    /// Firebase Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image upload or delete failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Algolia index sync failed.
    #[error("Search index error: {0}")]
    Search(#[from] AlgoliaError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Datastore(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) | Self::Search(_) => StatusCode::BAD_GATEWAY,
            Self::Storage(e) if is_rejected_upload(e) => StatusCode::BAD_REQUEST,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl AppError {
    /// Split errors the admin can fix by editing the form from real failures.
    ///
    /// Returns the message to show next to the form, or the error itself.
    pub fn form_message(self) -> std::result::Result<String, Self> {
        match self {
            Self::BadRequest(message) => Ok(message),
            Self::Storage(e) if is_rejected_upload(&e) => Ok(e.to_string()),
            other => Err(other),
        }
    }
}

const fn is_rejected_upload(e: &StorageError) -> bool {
    matches!(
        e,
        StorageError::NotAnImage(_) | StorageError::Empty | StorageError::TooLarge { .. }
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Datastore(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Auth(_) | Self::Search(_) => "External service error".to_string(),
            Self::Storage(_) if status.is_server_error() => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the signed-in admin.
pub fn set_sentry_user(uid: &str, email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("category lenses".to_string());
        assert_eq!(err.to_string(), "Not found: category lenses");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::NotFound(String::new())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Forbidden(String::new())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::BadRequest(String::new())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AppError::Internal(String::new())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejected_upload_is_a_client_error() {
        assert_eq!(
            status_of(AppError::Storage(StorageError::NotAnImage("text/plain".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::Storage(StorageError::Empty)), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_form_message_keeps_fixable_errors() {
        assert_eq!(
            AppError::BadRequest("Name is required".to_string()).form_message().ok(),
            Some("Name is required".to_string())
        );
        assert!(AppError::Storage(StorageError::Empty).form_message().is_ok());
        assert!(AppError::Internal("boom".to_string()).form_message().is_err());
    }
}
