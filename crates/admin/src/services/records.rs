//! Document lookups shared by the CRUD handlers.

use camrent_core::slugify;
use camrent_firebase::Query;
use serde::de::DeserializeOwned;

use super::form::FormData;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Fetch a document or fail with [`AppError::NotFound`].
///
/// # Errors
///
/// Returns `NotFound` for a missing document, or the datastore error.
pub async fn require<T: DeserializeOwned>(
    state: &AppState,
    collection: &str,
    id: &str,
) -> Result<T> {
    state
        .db()
        .fetch(collection, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{collection}/{id}")))
}

/// Slug from the `slug` field, or derived from `name` when left blank.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if the slug is empty or another document
/// in `collection` already uses it.
pub async fn unique_slug(
    state: &AppState,
    collection: &str,
    form: &FormData,
    name: &str,
    own_id: Option<&str>,
) -> Result<String> {
    let slug = slugify(&form.optional("slug").unwrap_or_else(|| name.to_string()));
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Slug must contain letters or digits".to_string(),
        ));
    }

    let taken = state
        .db()
        .list(&Query::collection(collection).where_eq("slug", slug.as_str()))
        .await?
        .iter()
        .any(|doc| Some(doc.id.as_str()) != own_id);
    if taken {
        return Err(AppError::BadRequest(format!("Slug \"{slug}\" is already in use")));
    }
    Ok(slug)
}

/// Whether any document in `collection` has `field == value`.
///
/// # Errors
///
/// Returns the datastore error.
pub async fn is_referenced(
    state: &AppState,
    collection: &str,
    field: &str,
    value: &str,
) -> Result<bool> {
    let query = Query::collection(collection).where_eq(field, value).limit(1);
    Ok(!state.db().list(&query).await?.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use camrent_core::models::collections;
    use camrent_firebase::{Datastore, MemoryDatastore, to_fields};
    use serde_json::json;

    use super::*;
    use crate::config::tests::test_config;

    async fn state() -> AppState {
        let db = MemoryDatastore::new();
        db.set(
            collections::CATEGORIES,
            "cameras",
            to_fields(&json!({"name": "Cameras", "slug": "cameras"})).unwrap(),
        )
        .await
        .unwrap();
        AppState::new(test_config(), Arc::new(db), None, None, None)
    }

    #[tokio::test]
    async fn test_slug_defaults_to_name() {
        let state = state().await;
        let form = FormData::from_pairs([("slug", "")]);
        let slug = unique_slug(&state, collections::CATEGORIES, &form, "Gimbals & Rigs", None)
            .await
            .unwrap();
        assert_eq!(slug, "gimbals-rigs");
    }

    #[tokio::test]
    async fn test_slug_must_be_unique() {
        let state = state().await;
        let form = FormData::from_pairs([("slug", "Cameras")]);
        assert!(matches!(
            unique_slug(&state, collections::CATEGORIES, &form, "x", None).await,
            Err(AppError::BadRequest(_))
        ));
        // Keeping its own slug on update is fine.
        assert!(
            unique_slug(&state, collections::CATEGORIES, &form, "x", Some("cameras"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_require_missing_is_not_found() {
        let state = state().await;
        let result: Result<serde_json::Value> =
            require(&state, collections::CATEGORIES, "lenses").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
