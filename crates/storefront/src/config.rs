//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `FIREBASE_PROJECT_ID` - see [`FirebaseConfig`]
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_CONTENT_DIR` - Markdown pages (default: `crates/storefront/content`)
//! - `FIREBASE_*`, `GOOGLE_APPLICATION_CREDENTIALS`, `FIRESTORE_EMULATOR_HOST`
//! - `ALGOLIA_*` - search falls back to the in-memory catalog without them
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Sentry error tracking

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use camrent_core::secret::{self, SecretError};
use camrent_firebase::{AlgoliaConfig, FirebaseConfig};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, SecretError),
    #[error(transparent)]
    Firebase(#[from] camrent_firebase::ConfigError),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Public base URL, also decides whether cookies are `Secure`.
    pub base_url: Url,
    pub session_secret: SecretString,
    pub content_dir: PathBuf,
    pub firebase: FirebaseConfig,
    /// `None` when Algolia is not configured.
    pub algolia: Option<AlgoliaConfig>,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the session secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;

        let session_secret = SecretString::from(get_required_env("STOREFRONT_SESSION_SECRET")?);
        secret::check_session_secret(session_secret.expose_secret()).map_err(|e| {
            ConfigError::InsecureSecret("STOREFRONT_SESSION_SECRET".to_string(), e)
        })?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            content_dir: get_optional_env("STOREFRONT_CONTENT_DIR")
                .map_or_else(|| PathBuf::from("crates/storefront/content"), PathBuf::from),
            firebase: FirebaseConfig::from_env()?,
            algolia: AlgoliaConfig::from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Loopback settings without Sentry or Algolia. The port follows
    /// `base_url`, defaulting to 3000.
    #[must_use]
    pub fn local(base_url: Url, firebase: FirebaseConfig, session_secret: SecretString) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: base_url.port().unwrap_or(3000),
            base_url,
            session_secret,
            content_dir: PathBuf::from("crates/storefront/content"),
            firebase,
            algolia: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .as_deref()
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> StorefrontConfig {
        let mut firebase = FirebaseConfig::for_project("camrent-test");
        firebase.emulator_host = Some("localhost:8080".to_string());
        StorefrontConfig::local(
            Url::parse(base_url).unwrap(),
            firebase,
            SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
        )
    }

    #[test]
    fn test_socket_addr() {
        let addr = config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        assert!(!config("http://localhost:3000").is_secure());
        assert!(config("https://camrent.example").is_secure());
    }

    #[test]
    fn test_debug_redacts_session_secret() {
        let output = format!("{:?}", config("http://localhost:3000"));
        assert!(!output.contains("aB3$xY9!"));
    }
}
