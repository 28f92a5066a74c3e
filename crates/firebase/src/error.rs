//! Errors returned by the Firebase and Algolia clients.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Canonical Google API status, reduced to the cases callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArgument,
    Unauthenticated,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    FailedPrecondition,
    ResourceExhausted,
    Unavailable,
    DeadlineExceeded,
    Internal,
}

impl ErrorCode {
    /// Map a `status` string from a Google error body.
    #[must_use]
    pub fn from_status(status: &str) -> Option<Self> {
        Some(match status {
            "INVALID_ARGUMENT" | "OUT_OF_RANGE" => Self::InvalidArgument,
            "UNAUTHENTICATED" => Self::Unauthenticated,
            "PERMISSION_DENIED" => Self::PermissionDenied,
            "NOT_FOUND" => Self::NotFound,
            "ALREADY_EXISTS" | "ABORTED" => Self::AlreadyExists,
            "FAILED_PRECONDITION" => Self::FailedPrecondition,
            "RESOURCE_EXHAUSTED" => Self::ResourceExhausted,
            "UNAVAILABLE" => Self::Unavailable,
            "DEADLINE_EXCEEDED" => Self::DeadlineExceeded,
            "INTERNAL" | "UNKNOWN" | "DATA_LOSS" | "CANCELLED" => Self::Internal,
            _ => return None,
        })
    }

    /// Fallback mapping from the HTTP status alone.
    #[must_use]
    pub fn from_http(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::AlreadyExists,
            StatusCode::PRECONDITION_FAILED => Self::FailedPrecondition,
            StatusCode::TOO_MANY_REQUESTS => Self::ResourceExhausted,
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => Self::Unavailable,
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => Self::DeadlineExceeded,
            s if s.is_client_error() => Self::InvalidArgument,
            _ => Self::Internal,
        }
    }

    /// Whether a request failing with this code may succeed if retried.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Unavailable | Self::ResourceExhausted | Self::DeadlineExceeded | Self::Internal
        )
    }
}

/// Errors from Firestore and the shared HTTP plumbing.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error status.
    #[error("Firebase API error ({code:?}): {message}")]
    Api { code: ErrorCode, message: String },

    /// A document that must exist does not.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A Firestore value or document could not be converted.
    #[error("Invalid document data: {0}")]
    Codec(String),

    /// A decoded document does not match the expected model.
    #[error("Failed to decode {collection}/{id}: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service-account credentials could not be loaded or exchanged.
    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl FirebaseError {
    /// The API error code, if this error came from an API response.
    #[must_use]
    pub const fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::NotFound { .. } => Some(ErrorCode::NotFound),
            _ => None,
        }
    }

    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::Api { code, .. } => code.is_retryable(),
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T, E = FirebaseError> = std::result::Result<T, E>;

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Build an [`FirebaseError::Api`] from a failed response.
///
/// The `status` field of a Google error body wins over the HTTP status.
pub(crate) fn api_error(status: StatusCode, body: &str) -> FirebaseError {
    let parsed = serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|b| b.error);

    let code = parsed
        .as_ref()
        .and_then(|e| e.status.as_deref())
        .and_then(ErrorCode::from_status)
        .unwrap_or_else(|| ErrorCode::from_http(status));

    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("HTTP error").to_string());

    FirebaseError::Api { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_body_status() {
        let body = r#"{"error":{"code":400,"message":"no such doc","status":"NOT_FOUND"}}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code(), Some(ErrorCode::NotFound));
        assert_eq!(err.to_string(), "Firebase API error (NotFound): no such doc");
    }

    #[test]
    fn test_api_error_falls_back_to_http_status() {
        let err = api_error(StatusCode::SERVICE_UNAVAILABLE, "<html>oops</html>");
        assert_eq!(err.code(), Some(ErrorCode::Unavailable));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = api_error(StatusCode::FORBIDDEN, "");
        assert_eq!(err.code(), Some(ErrorCode::PermissionDenied));
        assert!(!err.is_retryable());
    }
}
