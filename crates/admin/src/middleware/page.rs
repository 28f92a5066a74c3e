//! Layout data for admin pages.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tower_sessions::Session;

use super::auth::{AdminAuthRejection, RequireAdminAuth};
use crate::models::{CurrentAdmin, Flash};
use crate::state::AppState;

/// The signed-in admin plus what the sidebar and flash banner need.
///
/// Extracting it enforces the admin role, so every handler that renders a
/// page takes this instead of [`RequireAdminAuth`].
pub struct AdminPage {
    pub admin: CurrentAdmin,
    pub current_path: String,
    pub flash: Option<Flash>,
}

impl AdminPage {
    /// Whether the sidebar entry for `section` is the current one.
    #[must_use]
    pub fn is_active(&self, section: &str) -> bool {
        if section == "/" {
            return self.current_path == "/";
        }
        self.current_path == section
            || self
                .current_path
                .strip_prefix(section)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl FromRequestParts<AppState> for AdminPage {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        let flash = match parts.extensions.get::<Session>() {
            Some(session) => Flash::take(session).await,
            None => None,
        };

        Ok(Self {
            admin,
            current_path: parts.uri.path().to_string(),
            flash,
        })
    }
}

#[cfg(test)]
mod tests {
    use camrent_core::UserId;

    use super::*;

    fn page(path: &str) -> AdminPage {
        AdminPage {
            admin: CurrentAdmin {
                uid: UserId::new("u1"),
                email: "ops@camrent.test".to_string(),
            },
            current_path: path.to_string(),
            flash: None,
        }
    }

    #[test]
    fn test_is_active_matches_section_prefix() {
        assert!(page("/products").is_active("/products"));
        assert!(page("/products/abc/edit").is_active("/products"));
        assert!(!page("/products-archive").is_active("/products"));
        assert!(!page("/products").is_active("/"));
        assert!(page("/").is_active("/"));
    }
}
