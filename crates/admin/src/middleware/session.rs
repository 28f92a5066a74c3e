//! Session layer configuration for admin.
//!
//! Stricter than the storefront: `SameSite=Strict` and a 24 hour inactivity
//! expiry. Sessions are kept in memory; a restart signs admins out.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "camrent_admin_session";

/// 24 hours.
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

#[must_use]
pub fn create_session_layer(
    config: &AdminConfig,
    store: MemoryStore,
) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
