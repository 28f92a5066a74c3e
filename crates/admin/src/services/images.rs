//! Image fields backed by Firebase Storage.
//!
//! Forms post new files alongside the URLs they keep. Uploads happen before
//! the document write; objects that are no longer referenced are deleted
//! after it, best effort.

use tracing::{info, warn};

use super::form::FormData;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// File input for single-image forms.
pub const IMAGE_FILE: &str = "image_file";
/// Text input holding an external image URL.
pub const IMAGE_URL: &str = "image_url";
/// Checkbox clearing an optional image.
pub const REMOVE_IMAGE: &str = "remove_image";

/// Outcome of a single-image field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChange {
    /// Image to store on the document.
    pub url: Option<String>,
    /// Previous image to delete once the document is written.
    pub discarded: Option<String>,
}

/// Upload every file posted under `field` into `folder`.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if files were posted but uploads are not
/// configured, or the storage error for a rejected or failed upload.
pub async fn upload_all(
    state: &AppState,
    form: &FormData,
    field: &str,
    folder: &str,
) -> Result<Vec<String>> {
    let mut files = form.files(field).peekable();
    if files.peek().is_none() {
        return Ok(Vec::new());
    }
    let storage = state.storage().ok_or_else(|| {
        AppError::BadRequest("Image uploads are not configured; paste an image URL instead".into())
    })?;

    let mut urls = Vec::new();
    for file in files {
        let stored = storage
            .upload_image(folder, &file.filename, &file.content_type, file.bytes.clone())
            .await?;
        info!(path = %stored.path, "Image uploaded");
        urls.push(stored.url);
    }
    Ok(urls)
}

/// Resolve a single-image field against the document's current image.
///
/// An uploaded file wins over a pasted URL; with neither, the current image
/// stays unless the remove checkbox is ticked.
///
/// # Errors
///
/// Same as [`upload_all`].
pub async fn resolve_single(
    state: &AppState,
    form: &FormData,
    folder: &str,
    current: Option<&str>,
) -> Result<ImageChange> {
    let uploaded = upload_all(state, form, IMAGE_FILE, folder).await?;
    let url = match uploaded.into_iter().next() {
        Some(url) => Some(url),
        None => match form.optional(IMAGE_URL) {
            Some(url) => Some(url),
            None if form.checked(REMOVE_IMAGE) => None,
            None => current.map(ToString::to_string),
        },
    };
    let discarded = current
        .filter(|old| url.as_deref() != Some(*old))
        .map(ToString::to_string);
    Ok(ImageChange { url, discarded })
}

/// Like [`resolve_single`] for documents whose image is mandatory.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] when no image ends up set.
pub async fn resolve_required(
    state: &AppState,
    form: &FormData,
    folder: &str,
    current: Option<&str>,
) -> Result<(String, Option<String>)> {
    let change = resolve_single(state, form, folder, current).await?;
    let url = change
        .url
        .ok_or_else(|| AppError::BadRequest("An image is required".to_string()))?;
    Ok((url, change.discarded))
}

/// Delete images that are no longer referenced.
///
/// Failures are logged; the document write has already happened.
pub async fn discard<I, S>(state: &AppState, urls: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(storage) = state.storage() else {
        return;
    };
    for url in urls {
        let url = url.as_ref();
        if let Err(e) = storage.delete_by_url(url).await {
            warn!(url, error = %e, "Failed to delete image");
        }
    }
}
