//! `users/{uid}` documents.

use std::sync::Arc;

use camrent_core::cart::CartItem;
use camrent_core::models::{Role, UserProfile, collections};
use camrent_core::{ProductId, UserId};
use camrent_firebase::{Datastore, ErrorCode, Fields, FirebaseError, to_fields};
use serde_json::json;
use tracing::instrument;

/// Load a profile. A missing document is `None`.
///
/// # Errors
///
/// Returns an error if the datastore read fails.
pub async fn load_profile(
    db: &Arc<dyn Datastore>,
    uid: &UserId,
) -> Result<Option<UserProfile>, FirebaseError> {
    db.fetch(collections::USERS, uid.as_str()).await
}

/// Create the profile for a freshly registered account.
///
/// # Errors
///
/// Returns an error if the write fails.
#[instrument(skip(db))]
pub async fn create_profile(
    db: &Arc<dyn Datastore>,
    uid: &UserId,
    email: &str,
    display_name: Option<String>,
) -> Result<UserProfile, FirebaseError> {
    let profile = UserProfile {
        id: uid.clone(),
        email: email.to_string(),
        display_name,
        role: Role::Customer,
        cart: Vec::new(),
        favorites: Vec::new(),
    };
    db.put(collections::USERS, uid.as_str(), &profile).await?;
    Ok(profile)
}

/// Merge `fields` into the profile, creating the document if it is missing.
///
/// Accounts created outside the storefront (console, CLI) may have no
/// profile yet; they get one holding just these fields.
async fn save_fields(
    db: &Arc<dyn Datastore>,
    uid: &UserId,
    fields: Fields,
) -> Result<(), FirebaseError> {
    match db.update(collections::USERS, uid.as_str(), fields.clone()).await {
        Err(e) if e.code() == Some(ErrorCode::NotFound) => {
            db.set(collections::USERS, uid.as_str(), fields).await
        }
        other => other,
    }
}

/// # Errors
///
/// Returns an error if the write fails.
#[instrument(skip(db, cart), fields(lines = cart.len()))]
pub async fn save_cart(
    db: &Arc<dyn Datastore>,
    uid: &UserId,
    cart: &[CartItem],
) -> Result<(), FirebaseError> {
    save_fields(db, uid, to_fields(&json!({ "cart": cart }))?).await
}

/// # Errors
///
/// Returns an error if the write fails.
#[instrument(skip(db, favorites), fields(count = favorites.len()))]
pub async fn save_favorites(
    db: &Arc<dyn Datastore>,
    uid: &UserId,
    favorites: &[ProductId],
) -> Result<(), FirebaseError> {
    save_fields(db, uid, to_fields(&json!({ "favorites": favorites }))?).await
}
