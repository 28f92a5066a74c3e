//! Firestore REST v1 datastore.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use super::{Datastore, Write, not_found};
use crate::config::FirebaseConfig;
use crate::document::{Document, id_from_name};
use crate::error::{ErrorCode, FirebaseError, Result, api_error};
use crate::query::Query;
use crate::token::TokenSource;
use crate::value::{decode_fields, encode_fields};

const FIRESTORE_HOST: &str = "https://firestore.googleapis.com";

/// Bounded exponential backoff for transient Firestore failures.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(100),
            multiplier: 2.0,
            max_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl RetrySettings {
    fn should_retry(&self, attempt: usize, error: &FirebaseError) -> bool {
        attempt + 1 < self.max_attempts && error.is_retryable()
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        self.initial_delay
            .mul_f64(self.multiplier.powi(exponent))
            .min(self.max_delay)
    }
}

/// Firestore over HTTPS (or plain HTTP against the emulator).
#[derive(Debug, Clone)]
pub struct HttpDatastore {
    client: reqwest::Client,
    /// `projects/{project}/databases/(default)`
    database: String,
    /// `{host}/v1/projects/{project}/databases/(default)`
    database_url: String,
    token: TokenSource,
    retry: RetrySettings,
}

impl HttpDatastore {
    /// Create a datastore for the configured project.
    ///
    /// Uses the emulator when `FIRESTORE_EMULATOR_HOST` was set, otherwise
    /// the service-account key in the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or credentials
    /// cannot be loaded.
    pub async fn connect(config: &FirebaseConfig) -> Result<Self> {
        let (host, token) = match (&config.emulator_host, &config.credentials_path) {
            (Some(emulator), _) => (format!("http://{emulator}"), TokenSource::Emulator),
            (None, Some(path)) => (
                FIRESTORE_HOST.to_string(),
                TokenSource::service_account(path).await?,
            ),
            (None, None) => {
                return Err(FirebaseError::Credentials(
                    "set GOOGLE_APPLICATION_CREDENTIALS or FIRESTORE_EMULATOR_HOST".to_string(),
                ));
            }
        };
        Self::new(&host, &config.project_id, token, RetrySettings::default())
    }

    /// Create a datastore against an explicit host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        host: &str,
        project_id: &str,
        token: TokenSource,
        retry: RetrySettings,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(retry.request_timeout)
            .build()?;
        let database = format!("projects/{project_id}/databases/(default)");
        let database_url = format!("{}/v1/{database}", host.trim_end_matches('/'));

        Ok(Self {
            client,
            database,
            database_url,
            token,
            retry,
        })
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{collection}/{id}", self.database)
    }

    fn encode_write(&self, write: &Write) -> Value {
        match write {
            Write::Set {
                collection,
                id,
                fields,
            } => json!({
                "update": {
                    "name": self.document_name(collection, id),
                    "fields": encode_fields(fields),
                }
            }),
            Write::Update {
                collection,
                id,
                fields,
            } => {
                let mask: Vec<&String> = fields.keys().collect();
                json!({
                    "update": {
                        "name": self.document_name(collection, id),
                        "fields": encode_fields(fields),
                    },
                    "updateMask": { "fieldPaths": mask },
                    "currentDocument": { "exists": true },
                })
            }
            Write::Delete { collection, id } => json!({
                "delete": self.document_name(collection, id),
            }),
        }
    }

    /// Send a request, retrying transient failures.
    ///
    /// With `missing_ok`, a 404 yields `Ok(None)` instead of an error.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        missing_ok: bool,
    ) -> Result<Option<Value>> {
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, body, missing_ok).await {
                Ok(value) => return Ok(value),
                Err(err) if self.retry.should_retry(attempt, &err) => {
                    let delay = self.retry.backoff_delay(attempt);
                    warn!(attempt, ?delay, error = %err, "Retrying Firestore request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        missing_ok: bool,
    ) -> Result<Option<Value>> {
        let token = self.token.token().await?;
        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.is_empty() {
                return Ok(Some(Value::Null));
            }
            return Ok(Some(serde_json::from_str(&text)?));
        }
        if missing_ok && status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Err(api_error(status, &text))
    }
}

#[async_trait]
impl Datastore for HttpDatastore {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = format!("{}/documents/{collection}/{id}", self.database_url);
        let Some(body) = self.send(Method::GET, &url, None, true).await? else {
            debug!("Document not found");
            return Ok(None);
        };
        Ok(Some(Document::new(collection, id, decode_fields(&body)?)))
    }

    #[instrument(skip(self), fields(collection = %query.collection))]
    async fn list(&self, query: &Query) -> Result<Vec<Document>> {
        let url = format!("{}/documents:runQuery", self.database_url);
        let body = json!({ "structuredQuery": query.to_structured_query() });
        let response = self
            .send(Method::POST, &url, Some(&body), false)
            .await?
            .unwrap_or(Value::Null);

        let entries = response
            .as_array()
            .ok_or_else(|| FirebaseError::Codec("runQuery response must be an array".to_string()))?;

        let mut documents = Vec::with_capacity(entries.len());
        for entry in entries {
            // Entries without `document` only report progress (readTime).
            let Some(document) = entry.get("document") else {
                continue;
            };
            let id = document
                .get("name")
                .and_then(Value::as_str)
                .and_then(id_from_name)
                .ok_or_else(|| FirebaseError::Codec("document without a name".to_string()))?;
            documents.push(Document::new(
                query.collection.as_str(),
                id,
                decode_fields(document)?,
            ));
        }

        debug!(count = documents.len(), "Query returned documents");
        Ok(documents)
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let url = format!("{}/documents:commit", self.database_url);
        let encoded: Vec<Value> = writes.iter().map(|w| self.encode_write(w)).collect();
        let body = json!({ "writes": encoded });

        match self.send(Method::POST, &url, Some(&body), false).await {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some(ErrorCode::NotFound) => {
                // Only an update precondition can fail this way.
                let target = writes.iter().find_map(|w| match w {
                    Write::Update { collection, id, .. } => Some(not_found(collection, id)),
                    _ => None,
                });
                Err(target.unwrap_or(err))
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::Map;

    use super::*;

    fn datastore() -> HttpDatastore {
        HttpDatastore::new(
            "http://localhost:8080/",
            "demo",
            TokenSource::Emulator,
            RetrySettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let ds = datastore();
        assert_eq!(
            ds.database_url,
            "http://localhost:8080/v1/projects/demo/databases/(default)"
        );
        assert_eq!(
            ds.document_name("products", "abc"),
            "projects/demo/databases/(default)/documents/products/abc"
        );
    }

    #[test]
    fn test_encode_update_write_has_mask_and_precondition() {
        let mut fields = Map::new();
        fields.insert("order".to_string(), json!(3));
        let write = datastore().encode_write(&Write::update("categories", "c1", fields));

        assert_eq!(write["updateMask"], json!({"fieldPaths": ["order"]}));
        assert_eq!(write["currentDocument"], json!({"exists": true}));
        assert_eq!(
            write["update"]["fields"]["order"],
            json!({"integerValue": "3"})
        );
    }

    #[test]
    fn test_encode_delete_write() {
        let write = datastore().encode_write(&Write::delete("logos", "l1"));
        assert_eq!(
            write,
            json!({"delete": "projects/demo/databases/(default)/documents/logos/l1"})
        );
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetrySettings::default();
        assert_eq!(retry.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(retry.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(retry.backoff_delay(10), Duration::from_secs(2));
    }

    #[test]
    fn test_retry_stops_after_max_attempts() {
        let retry = RetrySettings::default();
        let err = FirebaseError::Api {
            code: ErrorCode::Unavailable,
            message: "busy".to_string(),
        };
        assert!(retry.should_retry(0, &err));
        assert!(!retry.should_retry(3, &err));
    }
}
