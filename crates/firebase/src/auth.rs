//! Firebase Authentication (Identity Toolkit REST v1).
//!
//! Email/password accounts only. The applications keep the returned user ID
//! in their own server-side session; ID tokens are not forwarded to browsers.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use camrent_core::UserId;

use crate::config::FirebaseConfig;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Errors from Firebase Authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No account exists for this email")]
    EmailNotFound,

    #[error("Incorrect password")]
    InvalidPassword,

    /// Returned instead of the two above when email enumeration protection
    /// is enabled on the project.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account already exists for this email")]
    EmailExists,

    #[error("Password is too weak: {0}")]
    WeakPassword(String),

    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    #[error("This account has been disabled")]
    UserDisabled,

    #[error("Session token is invalid or expired")]
    InvalidToken,

    #[error("Firebase Auth error: {0}")]
    Api(String),

    #[error("FIREBASE_API_KEY is not configured")]
    NotConfigured,
}

impl AuthError {
    /// Map the `error.message` code returned by Identity Toolkit.
    ///
    /// Codes may carry detail after a colon
    /// (`WEAK_PASSWORD : Password should be at least 6 characters`).
    #[must_use]
    pub fn from_code(message: &str) -> Self {
        let (code, detail) = message
            .split_once(':')
            .map_or((message.trim(), ""), |(c, d)| (c.trim(), d.trim()));
        match code {
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => Self::InvalidCredentials,
            "EMAIL_EXISTS" => Self::EmailExists,
            "WEAK_PASSWORD" => Self::WeakPassword(detail.to_string()),
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "USER_DISABLED" => Self::UserDisabled,
            "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" => Self::InvalidToken,
            _ => Self::Api(message.to_string()),
        }
    }

    /// Whether the message is safe and useful to show on a sign-in form.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Http(_) | Self::Api(_) | Self::NotConfigured)
    }
}

/// A signed-in (or newly registered) account.
#[derive(Clone)]
pub struct SignedIn {
    pub uid: UserId,
    pub email: String,
    pub id_token: SecretString,
}

impl std::fmt::Debug for SignedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedIn")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Account details returned by `accounts:lookup`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(rename = "localId")]
    pub uid: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: UserId,
    #[serde(default)]
    email: String,
    id_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Identity Toolkit client.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthClient {
    /// Create a client from the project configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotConfigured`] without an API key.
    pub fn new(config: &FirebaseConfig) -> Result<Self, AuthError> {
        let api_key = config.api_key.clone().ok_or(AuthError::NotConfigured)?;
        let base_url = config.auth_emulator_host.as_ref().map_or_else(
            || IDENTITY_TOOLKIT_URL.to_string(),
            |host| format!("http://{host}/identitytoolkit.googleapis.com/v1"),
        );
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    fn url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{method}?key={}",
            self.base_url,
            urlencoding::encode(self.api_key.expose_secret())
        )
    }

    async fn call<B, R>(&self, method: &str, body: &B) -> Result<R, AuthError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(self.url(method)).json(body).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        debug!(%status, method, "Identity Toolkit request failed");
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(AuthError::from_code(&body.error.message)),
            Err(_) => Err(AuthError::Api(format!("{status}: {text}"))),
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the mapped Firebase error for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, AuthError> {
        let response: PasswordResponse = self
            .call(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    /// Create an email/password account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailExists`] or [`AuthError::WeakPassword`] for
    /// rejected registrations.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let response: PasswordResponse = self
            .call(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    /// Look up the account behind an ID token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is invalid, expired,
    /// or belongs to a deleted user.
    #[instrument(skip_all)]
    pub async fn lookup(&self, id_token: &SecretString) -> Result<AccountInfo, AuthError> {
        let response: LookupResponse = self
            .call(
                "lookup",
                &serde_json::json!({ "idToken": id_token.expose_secret() }),
            )
            .await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::InvalidToken)
    }

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns the mapped Firebase error; callers should not reveal
    /// [`AuthError::EmailNotFound`] to the visitor.
    #[instrument(skip(self))]
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let _: serde_json::Value = self
            .call(
                "sendOobCode",
                &serde_json::json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }
}

impl From<PasswordResponse> for SignedIn {
    fn from(response: PasswordResponse) -> Self {
        Self {
            uid: response.local_id,
            email: response.email,
            id_token: SecretString::from(response.id_token),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert!(matches!(AuthError::from_code("EMAIL_EXISTS"), AuthError::EmailExists));
        assert!(matches!(
            AuthError::from_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from_code("TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"),
            AuthError::TooManyAttempts
        ));
        match AuthError::from_code("WEAK_PASSWORD : Password should be at least 6 characters") {
            AuthError::WeakPassword(detail) => {
                assert_eq!(detail, "Password should be at least 6 characters");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(AuthError::from_code("SOMETHING_NEW"), AuthError::Api(_)));
    }

    #[test]
    fn test_user_facing() {
        assert!(AuthError::InvalidCredentials.is_user_facing());
        assert!(!AuthError::Api("x".to_string()).is_user_facing());
    }

    #[test]
    fn test_emulator_url() {
        let config = FirebaseConfig {
            api_key: Some(SecretString::from("fake-key")),
            auth_emulator_host: Some("localhost:9099".to_string()),
            ..FirebaseConfig::for_project("demo")
        };
        let client = AuthClient::new(&config).unwrap();
        assert_eq!(
            client.url("signUp"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp?key=fake-key"
        );
    }

    #[test]
    fn test_missing_api_key() {
        let config = FirebaseConfig::for_project("demo");
        assert!(matches!(AuthClient::new(&config), Err(AuthError::NotConfigured)));
    }

    #[test]
    fn test_account_info_decodes_lookup_user() {
        let json = r#"{"users":[{"localId":"u1","email":"a@b.co","emailVerified":true}]}"#;
        let response: LookupResponse = serde_json::from_str(json).unwrap();
        let user = &response.users[0];
        assert_eq!(user.uid.as_str(), "u1");
        assert!(user.email_verified);
        assert!(!user.disabled);
    }
}
