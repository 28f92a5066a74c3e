//! Admin console access.
//!
//! Access is the `role` field on `users/{uid}`. The admin console checks it
//! on every request, so revoking takes effect immediately.

use camrent_core::models::{Role, UserProfile, collections};
use camrent_firebase::{Datastore, FirebaseError, to_fields};
use serde_json::json;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("No user document for uid {0}")]
    UnknownUser(String),

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirebaseError),
}

/// Make `uid` an admin, creating the user document if needed.
///
/// # Errors
///
/// Returns an error if Firestore cannot be read or written.
pub async fn grant(db: &dyn Datastore, uid: &str, email: Option<&str>) -> Result<(), AdminError> {
    if db.exists(collections::USERS, uid).await? {
        set_role(db, uid, Role::Admin).await?;
    } else {
        let profile = UserProfile {
            email: email.unwrap_or_default().to_string(),
            role: Role::Admin,
            ..UserProfile::default()
        };
        db.put(collections::USERS, uid, &profile).await?;
        info!(uid, "Created user document");
    }
    info!(uid, "Admin access granted");
    Ok(())
}

/// Demote `uid` to a customer.
///
/// # Errors
///
/// Returns [`AdminError::UnknownUser`] if there is no user document.
pub async fn revoke(db: &dyn Datastore, uid: &str) -> Result<(), AdminError> {
    match set_role(db, uid, Role::Customer).await {
        Ok(()) => {
            info!(uid, "Admin access revoked");
            Ok(())
        }
        Err(FirebaseError::NotFound { .. }) => Err(AdminError::UnknownUser(uid.to_string())),
        Err(e) => Err(e.into()),
    }
}

async fn set_role(db: &dyn Datastore, uid: &str, role: Role) -> Result<(), FirebaseError> {
    db.update(
        collections::USERS,
        uid,
        to_fields(&json!({ "role": role.as_str() }))?,
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use camrent_firebase::MemoryDatastore;

    use super::*;

    async fn profile(db: &dyn Datastore, uid: &str) -> UserProfile {
        db.fetch(collections::USERS, uid).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_grant_keeps_existing_fields() {
        let db = MemoryDatastore::new();
        db.set(
            collections::USERS,
            "u1",
            to_fields(&json!({"email": "ana@camrent.test", "favorites": ["p1"]})).unwrap(),
        )
        .await
        .unwrap();

        grant(&db, "u1", None).await.unwrap();
        let user = profile(&db, "u1").await;
        assert!(user.is_admin());
        assert_eq!(user.email, "ana@camrent.test");
        assert_eq!(user.favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_grant_creates_missing_user() {
        let db = MemoryDatastore::new();
        grant(&db, "u2", Some("ops@camrent.test")).await.unwrap();
        let user = profile(&db, "u2").await;
        assert!(user.is_admin());
        assert_eq!(user.email, "ops@camrent.test");
    }

    #[tokio::test]
    async fn test_revoke() {
        let db = MemoryDatastore::new();
        grant(&db, "u3", None).await.unwrap();
        revoke(&db, "u3").await.unwrap();
        assert!(!profile(&db, "u3").await.is_admin());

        assert!(matches!(
            revoke(&db, "missing").await,
            Err(AdminError::UnknownUser(_))
        ));
    }
}
