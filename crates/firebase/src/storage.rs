//! Firebase Storage (REST v0) image uploads.

use std::fmt::Write as _;

use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::FirebaseConfig;
use crate::token::TokenSource;

const STORAGE_HOST: &str = "https://firebasestorage.googleapis.com";

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const MAX_FILENAME_LENGTH: usize = 100;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("Only image uploads are accepted (got {0})")]
    NotAnImage(String),

    #[error("File is too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("File is empty")]
    Empty,

    #[error("Credentials error: {0}")]
    Credentials(#[from] crate::error::FirebaseError),
}

/// An object stored in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path inside the bucket, e.g. `products/{uuid}-lens.jpg`.
    pub path: String,
    /// Public download URL carrying the object's download token.
    pub url: String,
}

/// Client for a single Storage bucket.
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    host: String,
    bucket: String,
    token: TokenSource,
}

impl StorageClient {
    #[must_use]
    pub fn new(bucket: &str, token: TokenSource) -> Self {
        Self::with_host(STORAGE_HOST, bucket, token)
    }

    #[must_use]
    pub fn with_host(host: &str, bucket: &str, token: TokenSource) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            token,
        }
    }

    /// Build a client from project configuration.
    ///
    /// Returns `Ok(None)` when no bucket is configured. Uses the Storage
    /// emulator when `FIREBASE_STORAGE_EMULATOR_HOST` was set, otherwise the
    /// service-account key.
    ///
    /// # Errors
    ///
    /// Returns an error if a bucket is configured but no credentials are
    /// available, or the key cannot be loaded.
    pub async fn connect(config: &FirebaseConfig) -> Result<Option<Self>, StorageError> {
        let Some(bucket) = config.storage_bucket.as_deref() else {
            return Ok(None);
        };
        let client = match (&config.storage_emulator_host, &config.credentials_path) {
            (Some(emulator), _) => {
                Self::with_host(&format!("http://{emulator}"), bucket, TokenSource::Emulator)
            }
            (None, Some(path)) => Self::new(bucket, TokenSource::service_account(path).await?),
            (None, None) => {
                return Err(StorageError::Credentials(
                    crate::error::FirebaseError::Credentials(
                        "set GOOGLE_APPLICATION_CREDENTIALS or FIREBASE_STORAGE_EMULATOR_HOST"
                            .to_string(),
                    ),
                ));
            }
        };
        Ok(Some(client))
    }

    fn objects_url(&self) -> String {
        format!("{}/v0/b/{}/o", self.host, self.bucket)
    }

    fn download_url(&self, path: &str, download_token: &str) -> String {
        format!(
            "{}/{}?alt=media&token={download_token}",
            self.objects_url(),
            urlencoding::encode(path)
        )
    }

    /// Upload an image under `folder` and return its download URL.
    ///
    /// # Errors
    ///
    /// Returns an error for non-image content, empty or oversized files, and
    /// failed uploads.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        validate_upload(content_type, bytes.len())?;

        let path = object_path(folder, Uuid::new_v4(), filename);
        let download_token = Uuid::new_v4().to_string();
        let metadata = json!({
            "name": path,
            "contentType": content_type,
            "metadata": { "firebaseStorageDownloadTokens": download_token },
        });

        let boundary = format!("camrent-{}", Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata.to_string(), content_type, &bytes);

        let url = format!(
            "{}?uploadType=multipart&name={}",
            self.objects_url(),
            urlencoding::encode(&path)
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.token().await?)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StorageError::Api { status, message });
        }

        debug!(path = %path, "Uploaded object");
        Ok(StoredObject {
            url: self.download_url(&path, &download_token),
            path,
        })
    }

    /// Delete the object behind a download URL.
    ///
    /// URLs that do not point into this bucket (external images, seed data)
    /// are ignored, as are objects that are already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete request fails.
    #[instrument(skip(self))]
    pub async fn delete_by_url(&self, url: &str) -> Result<(), StorageError> {
        let Some(path) = self.path_from_url(url) else {
            debug!("Not a bucket URL, skipping delete");
            return Ok(());
        };

        let response = self
            .client
            .delete(format!("{}/{}", self.objects_url(), urlencoding::encode(&path)))
            .bearer_auth(self.token.token().await?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Api { status, message })
    }

    /// Object path encoded in one of this bucket's download URLs.
    #[must_use]
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.objects_url());
        let encoded = url.strip_prefix(&prefix)?;
        let encoded = encoded.split('?').next().unwrap_or(encoded);
        if encoded.is_empty() {
            return None;
        }
        urlencoding::decode(encoded).ok().map(|p| p.into_owned())
    }
}

fn validate_upload(content_type: &str, size: usize) -> Result<(), StorageError> {
    if !content_type.starts_with("image/") {
        return Err(StorageError::NotAnImage(content_type.to_string()));
    }
    if size == 0 {
        return Err(StorageError::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(StorageError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// `{folder}/{uuid}-{sanitized filename}`
fn object_path(folder: &str, id: Uuid, filename: &str) -> String {
    format!("{}/{id}-{}", folder.trim_matches('/'), sanitize_filename(filename))
}

/// Lowercase the name and keep only `[a-z0-9._-]`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    // Browsers on Windows may send the full client path.
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    let trimmed: String = out
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .collect();
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed
    }
}

fn multipart_related(boundary: &str, metadata: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut head = String::new();
    let _ = write!(
        head,
        "--{boundary}\r\nContent-Type: application/json; charset=utf-8\r\n\r\n{metadata}\r\n\
         --{boundary}\r\nContent-Type: {content_type}\r\n\r\n"
    );
    let tail = format!("\r\n--{boundary}--");

    let mut body = Vec::with_capacity(head.len() + bytes.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(tail.as_bytes());
    body
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> StorageClient {
        StorageClient::new("camrent.appspot.com", TokenSource::Emulator)
    }

    #[tokio::test]
    async fn test_connect_without_bucket_disables_uploads() {
        let config = FirebaseConfig::for_project("camrent");
        assert!(StorageClient::connect(&config).await.unwrap().is_none());

        let config = FirebaseConfig {
            storage_bucket: Some("camrent.appspot.com".to_string()),
            storage_emulator_host: Some("localhost:9199".to_string()),
            ..config
        };
        let client = StorageClient::connect(&config).await.unwrap().unwrap();
        assert!(client.objects_url().starts_with("http://localhost:9199/v0/b/camrent.appspot.com"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Canon EOS R5.JPG"), "canon-eos-r5.jpg");
        assert_eq!(sanitize_filename("C:\\Users\\me\\lens (1).png"), "lens-1-.png");
        assert_eq!(sanitize_filename("???"), "image");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_FILENAME_LENGTH);
    }

    #[test]
    fn test_object_path() {
        let id = Uuid::nil();
        assert_eq!(
            object_path("/products/", id, "photo.jpg"),
            "products/00000000-0000-0000-0000-000000000000-photo.jpg"
        );
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("image/png", 10).is_ok());
        assert!(matches!(
            validate_upload("application/pdf", 10),
            Err(StorageError::NotAnImage(_))
        ));
        assert!(matches!(validate_upload("image/png", 0), Err(StorageError::Empty)));
        assert!(matches!(
            validate_upload("image/png", MAX_UPLOAD_BYTES + 1),
            Err(StorageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_download_url_round_trips_to_path() {
        let client = client();
        let url = client.download_url("banners/abc-hero.jpg", "tok");
        assert_eq!(
            url,
            "https://firebasestorage.googleapis.com/v0/b/camrent.appspot.com/o/banners%2Fabc-hero.jpg?alt=media&token=tok"
        );
        assert_eq!(client.path_from_url(&url).unwrap(), "banners/abc-hero.jpg");
    }

    #[test]
    fn test_foreign_urls_are_not_bucket_paths() {
        let client = client();
        assert!(client.path_from_url("https://cdn.example.com/a.jpg").is_none());
        assert!(client
            .path_from_url("https://firebasestorage.googleapis.com/v0/b/other-bucket/o/a.jpg")
            .is_none());
    }

    #[test]
    fn test_multipart_related_layout() {
        let body = multipart_related("b", "{}", "image/png", b"PNG");
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("--b\r\nContent-Type: application/json"));
        assert!(text.contains("Content-Type: image/png\r\n\r\nPNG\r\n--b--"));
    }
}
