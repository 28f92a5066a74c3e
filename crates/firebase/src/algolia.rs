//! Algolia product index (REST v1).
//!
//! Reads go to the DSN host with the search key; writes go to the main host
//! with the admin key. Ranking is left entirely to Algolia.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument};

use camrent_core::models::Product;

use crate::config::AlgoliaConfig;

#[derive(Debug, Error)]
pub enum AlgoliaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Algolia API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Algolia {0} key is not configured")]
    MissingKey(&'static str),
}

/// The indexed shape of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub brand: String,
    pub price_per_day: f64,
    pub image: Option<String>,
}

impl ProductRecord {
    /// Build a record, denormalizing category and brand names.
    #[must_use]
    pub fn from_product(product: &Product, category: &str, brand: &str) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        Self {
            object_id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            category: category.to_string(),
            brand: brand.to_string(),
            price_per_day: product.price_per_day.to_f64().unwrap_or_default(),
            image: product.cover_image().map(ToString::to_string),
        }
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price_per_day: f64,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// Client for one Algolia index.
#[derive(Clone)]
pub struct AlgoliaClient {
    client: reqwest::Client,
    app_id: String,
    index: String,
    search_key: Option<SecretString>,
    admin_key: Option<SecretString>,
    search_host: String,
    write_host: String,
}

impl std::fmt::Debug for AlgoliaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgoliaClient")
            .field("app_id", &self.app_id)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl AlgoliaClient {
    #[must_use]
    pub fn new(config: &AlgoliaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            app_id: config.app_id.clone(),
            index: config.index.clone(),
            search_key: config.search_key.clone(),
            admin_key: config.admin_key.clone(),
            search_host: format!("https://{}-dsn.algolia.net", config.app_id),
            write_host: format!("https://{}.algolia.net", config.app_id),
        }
    }

    #[must_use]
    pub fn can_write(&self) -> bool {
        self.admin_key.is_some()
    }

    fn index_url(&self, host: &str, suffix: &str) -> String {
        format!(
            "{host}/1/indexes/{}/{suffix}",
            urlencoding::encode(&self.index)
        )
    }

    async fn post(
        &self,
        url: String,
        key: &SecretString,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, AlgoliaError> {
        let response = self
            .client
            .post(url)
            .header("X-Algolia-Application-Id", &self.app_id)
            .header("X-Algolia-API-Key", key.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(AlgoliaError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn write_key(&self) -> Result<&SecretString, AlgoliaError> {
        self.admin_key.as_ref().ok_or(AlgoliaError::MissingKey("admin"))
    }

    /// Full-text search.
    ///
    /// # Errors
    ///
    /// Returns an error if no key is configured or the request fails.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        hits_per_page: usize,
    ) -> Result<Vec<SearchHit>, AlgoliaError> {
        // The admin key can search too; prefer the restricted one.
        let key = self
            .search_key
            .as_ref()
            .or(self.admin_key.as_ref())
            .ok_or(AlgoliaError::MissingKey("search"))?;

        let body = json!({ "query": query, "hitsPerPage": hits_per_page });
        let response: SearchResponse = self
            .post(self.index_url(&self.search_host, "query"), key, &body)
            .await?
            .json()
            .await?;

        debug!(hits = response.hits.len(), "Algolia search");
        Ok(response.hits)
    }

    /// Add or replace records.
    ///
    /// # Errors
    ///
    /// Returns an error without an admin key or if the batch fails.
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn save_objects(&self, records: &[ProductRecord]) -> Result<(), AlgoliaError> {
        if records.is_empty() {
            return Ok(());
        }
        let requests: Vec<_> = records
            .iter()
            .map(|record| json!({ "action": "updateObject", "body": record }))
            .collect();
        self.post(
            self.index_url(&self.write_host, "batch"),
            self.write_key()?,
            &json!({ "requests": requests }),
        )
        .await?;
        Ok(())
    }

    /// Remove one record.
    ///
    /// # Errors
    ///
    /// Returns an error without an admin key or if the batch fails.
    #[instrument(skip(self))]
    pub async fn delete_object(&self, object_id: &str) -> Result<(), AlgoliaError> {
        let body = json!({
            "requests": [{ "action": "deleteObject", "body": { "objectID": object_id } }]
        });
        self.post(
            self.index_url(&self.write_host, "batch"),
            self.write_key()?,
            &body,
        )
        .await?;
        Ok(())
    }

    /// Remove every record, keeping index settings.
    ///
    /// # Errors
    ///
    /// Returns an error without an admin key or if the request fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), AlgoliaError> {
        self.post(
            self.index_url(&self.write_host, "clear"),
            self.write_key()?,
            &json!({}),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn config() -> AlgoliaConfig {
        AlgoliaConfig {
            app_id: "APP1".to_string(),
            search_key: Some(SecretString::from("search")),
            admin_key: None,
            index: "dev products".to_string(),
        }
    }

    #[test]
    fn test_index_urls() {
        let client = AlgoliaClient::new(&config());
        assert_eq!(
            client.index_url(&client.search_host, "query"),
            "https://APP1-dsn.algolia.net/1/indexes/dev%20products/query"
        );
        assert_eq!(
            client.index_url(&client.write_host, "batch"),
            "https://APP1.algolia.net/1/indexes/dev%20products/batch"
        );
    }

    #[test]
    fn test_write_requires_admin_key() {
        let client = AlgoliaClient::new(&config());
        assert!(!client.can_write());
        assert!(matches!(
            client.write_key(),
            Err(AlgoliaError::MissingKey("admin"))
        ));
    }

    #[test]
    fn test_record_shape() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Sony FX3",
            "slug": "sony-fx3",
            "description": "Cinema line",
            "categoryId": "cams",
            "pricePerDay": 85.5,
            "images": ["https://img/fx3.jpg"]
        }))
        .unwrap();
        assert_eq!(product.price_per_day, Decimal::new(855, 1));

        let record = ProductRecord::from_product(&product, "Cameras", "Sony");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["objectID"], json!("p1"));
        assert_eq!(value["pricePerDay"], json!(85.5));
        assert_eq!(value["category"], json!("Cameras"));
        assert_eq!(value["image"], json!("https://img/fx3.jpg"));
    }

    #[test]
    fn test_search_hit_tolerates_missing_fields() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"hits":[{"objectID":"p1","name":"FX3"}],"nbHits":1}"#)
                .unwrap();
        assert_eq!(response.hits.len(), 1);
        assert!(response.hits.first().unwrap().image.is_none());
    }
}
