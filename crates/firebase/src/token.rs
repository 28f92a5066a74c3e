//! Bearer tokens for Google APIs.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use yup_oauth2::ServiceAccountAuthenticator;
use yup_oauth2::authenticator::DefaultAuthenticator;

use crate::error::{FirebaseError, Result};

/// Scope covering Firestore and Cloud Storage.
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Token the Firebase emulators accept as an administrator.
const EMULATOR_TOKEN: &str = "owner";

/// Source of `Authorization: Bearer` tokens.
#[derive(Clone)]
pub enum TokenSource {
    /// Service-account credentials exchanged through OAuth 2.0. The
    /// authenticator caches tokens and refreshes them before expiry.
    ServiceAccount(Arc<DefaultAuthenticator>),
    /// Local emulator, which accepts a fixed token.
    Emulator,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceAccount(_) => f.write_str("TokenSource::ServiceAccount"),
            Self::Emulator => f.write_str("TokenSource::Emulator"),
        }
    }
}

impl TokenSource {
    /// Load a service-account key file.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Credentials`] if the key cannot be read or the
    /// authenticator cannot be built.
    pub async fn service_account(key_path: &Path) -> Result<Self> {
        let key = yup_oauth2::read_service_account_key(key_path)
            .await
            .map_err(|e| {
                FirebaseError::Credentials(format!(
                    "failed to read service account key '{}': {e}",
                    key_path.display()
                ))
            })?;

        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| FirebaseError::Credentials(format!("failed to build authenticator: {e}")))?;

        debug!(path = %key_path.display(), "Loaded service account credentials");
        Ok(Self::ServiceAccount(Arc::new(authenticator)))
    }

    /// Current access token.
    ///
    /// # Errors
    ///
    /// Returns [`FirebaseError::Credentials`] if the token exchange fails.
    pub async fn token(&self) -> Result<String> {
        match self {
            Self::ServiceAccount(authenticator) => {
                let token = authenticator
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| FirebaseError::Credentials(e.to_string()))?;
                token
                    .token()
                    .map(ToString::to_string)
                    .ok_or_else(|| FirebaseError::Credentials("empty access token".to_string()))
            }
            Self::Emulator => Ok(EMULATOR_TOKEN.to_string()),
        }
    }
}
