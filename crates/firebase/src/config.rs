//! Firebase and Algolia configuration shared by every binary.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_PROJECT_ID` - Google Cloud project ID
//!
//! ## Optional
//! - `FIREBASE_API_KEY` - Web API key, required for sign-in (Identity Toolkit)
//! - `FIREBASE_STORAGE_BUCKET` - Storage bucket for image uploads
//! - `GOOGLE_APPLICATION_CREDENTIALS` - Path to a service-account key file
//! - `FIRESTORE_EMULATOR_HOST` - `host:port` of the Firestore emulator
//! - `FIREBASE_AUTH_EMULATOR_HOST` - `host:port` of the Auth emulator
//! - `FIREBASE_STORAGE_EMULATOR_HOST` - `host:port` of the Storage emulator
//! - `ALGOLIA_APP_ID`, `ALGOLIA_SEARCH_KEY`, `ALGOLIA_ADMIN_KEY` - Algolia
//!   credentials; search is disabled unless the app ID and one key are set
//! - `ALGOLIA_INDEX` - Index name (default: `products`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Firebase project settings.
///
/// `Debug` redacts the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: Option<SecretString>,
    pub storage_bucket: Option<String>,
    pub credentials_path: Option<PathBuf>,
    pub emulator_host: Option<String>,
    pub auth_emulator_host: Option<String>,
    pub storage_emulator_host: Option<String>,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("storage_bucket", &self.storage_bucket)
            .field("credentials_path", &self.credentials_path)
            .field("emulator_host", &self.emulator_host)
            .field("auth_emulator_host", &self.auth_emulator_host)
            .field("storage_emulator_host", &self.storage_emulator_host)
            .finish()
    }
}

impl FirebaseConfig {
    /// Settings for a project with every optional service left off.
    #[must_use]
    pub fn for_project(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            storage_bucket: None,
            credentials_path: None,
            emulator_host: None,
            auth_emulator_host: None,
            storage_emulator_host: None,
        }
    }

    /// Load from the environment. The caller loads `.env` first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `FIREBASE_PROJECT_ID` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            project_id: required("FIREBASE_PROJECT_ID")?,
            api_key: optional("FIREBASE_API_KEY").map(SecretString::from),
            storage_bucket: optional("FIREBASE_STORAGE_BUCKET"),
            credentials_path: optional("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            emulator_host: optional("FIRESTORE_EMULATOR_HOST"),
            auth_emulator_host: optional("FIREBASE_AUTH_EMULATOR_HOST"),
            storage_emulator_host: optional("FIREBASE_STORAGE_EMULATOR_HOST"),
        })
    }
}

/// Algolia application settings.
///
/// `Debug` redacts both keys.
#[derive(Clone)]
pub struct AlgoliaConfig {
    pub app_id: String,
    pub search_key: Option<SecretString>,
    pub admin_key: Option<SecretString>,
    pub index: String,
}

impl std::fmt::Debug for AlgoliaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaConfig")
            .field("app_id", &self.app_id)
            .field("search_key", &self.search_key.as_ref().map(|_| "[REDACTED]"))
            .field("admin_key", &self.admin_key.as_ref().map(|_| "[REDACTED]"))
            .field("index", &self.index)
            .finish()
    }
}

impl AlgoliaConfig {
    /// Load from the environment, `None` if Algolia is not configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let app_id = optional("ALGOLIA_APP_ID")?;
        let search_key = optional("ALGOLIA_SEARCH_KEY").map(SecretString::from);
        let admin_key = optional("ALGOLIA_ADMIN_KEY").map(SecretString::from);
        if search_key.is_none() && admin_key.is_none() {
            return None;
        }
        Some(Self {
            app_id,
            search_key,
            admin_key,
            index: optional("ALGOLIA_INDEX").unwrap_or_else(|| "products".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    optional(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Unset and empty variables are both treated as absent.
fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_keys() {
        let firebase = FirebaseConfig {
            project_id: "camrent-demo".to_string(),
            api_key: Some(SecretString::from("AIzaSyTopSecretValue")),
            storage_bucket: None,
            credentials_path: None,
            emulator_host: Some("localhost:8080".to_string()),
            auth_emulator_host: None,
            storage_emulator_host: None,
        };
        let output = format!("{firebase:?}");
        assert!(output.contains("camrent-demo"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("AIzaSyTopSecretValue"));

        let algolia = AlgoliaConfig {
            app_id: "APP123".to_string(),
            search_key: Some(SecretString::from("search-secret")),
            admin_key: Some(SecretString::from("admin-secret")),
            index: "products".to_string(),
        };
        let output = format!("{algolia:?}");
        assert!(!output.contains("search-secret"));
        assert!(!output.contains("admin-secret"));
    }
}
