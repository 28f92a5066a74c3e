//! Cached reads of catalog and site-settings documents.
//!
//! Every storefront page needs the catalog, the taxonomy and the settings
//! documents. They change only when an admin edits them, so whole collections
//! are cached in `moka` for a short TTL and filtered in memory.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use camrent_core::models::{
    Banner, BgImage, Brand, Category, Footer, Logo, PopupMessage, PopupSettings, Product, RedBar,
    collections,
};
use camrent_core::{ProductId, ordering};
use camrent_firebase::{Datastore, FirebaseError, Query};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

const CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
#[error("failed to read {collection}: {source}")]
pub struct CatalogError {
    pub collection: &'static str,
    #[source]
    pub source: FirebaseError,
}

type CacheValue = Arc<dyn Any + Send + Sync>;

/// Read-through cache over the datastore.
#[derive(Clone)]
pub struct CatalogClient {
    db: Arc<dyn Datastore>,
    /// Keyed by collection name, or `settings/{id}` for settings documents.
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    #[must_use]
    pub fn new(db: Arc<dyn Datastore>) -> Self {
        Self::with_ttl(db, CACHE_TTL)
    }

    #[must_use]
    pub fn with_ttl(db: Arc<dyn Datastore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(64).time_to_live(ttl).build();
        Self { db, cache }
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    async fn collection<T>(&self, collection: &'static str) -> Result<Arc<Vec<T>>, CatalogError>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        if let Some(cached) = self.cache.get(collection).await
            && let Ok(items) = cached.downcast::<Vec<T>>()
        {
            debug!(collection, "Cache hit");
            return Ok(items);
        }

        let items: Arc<Vec<T>> = Arc::new(
            self.db
                .fetch_readable(&Query::collection(collection))
                .await
                .map_err(|source| CatalogError { collection, source })?,
        );
        self.cache
            .insert(collection.to_string(), items.clone())
            .await;
        Ok(items)
    }

    async fn setting<T>(&self, id: &'static str) -> Result<Arc<T>, CatalogError>
    where
        T: DeserializeOwned + Default + Send + Sync + 'static,
    {
        let key = format!("{}/{id}", collections::SETTINGS);
        if let Some(cached) = self.cache.get(&key).await
            && let Ok(value) = cached.downcast::<T>()
        {
            return Ok(value);
        }

        let value: Arc<T> = Arc::new(
            self.db
                .fetch(collections::SETTINGS, id)
                .await
                .map_err(|source| CatalogError {
                    collection: collections::SETTINGS,
                    source,
                })?
                .unwrap_or_default(),
        );
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }

    /// Every readable product, in datastore order.
    ///
    /// Documents that do not decode are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, CatalogError> {
        self.collection(collections::PRODUCTS).await
    }

    /// Look up a product by slug, falling back to its document ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    #[instrument(skip(self))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, CatalogError> {
        let products = self.products().await?;
        Ok(products
            .iter()
            .find(|p| p.slug == slug)
            .or_else(|| products.iter().find(|p| p.id.as_str() == slug))
            .cloned())
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products().await?.iter().find(|p| &p.id == id).cloned())
    }

    /// Categories in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let categories = self.collection::<Category>(collections::CATEGORIES).await?;
        Ok(ordering::sorted(&categories))
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn brands(&self) -> Result<Arc<Vec<Brand>>, CatalogError> {
        self.collection(collections::BRANDS).await
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn banners(&self) -> Result<Arc<Vec<Banner>>, CatalogError> {
        self.collection(collections::BANNERS).await
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn logos(&self) -> Result<Arc<Vec<Logo>>, CatalogError> {
        self.collection(collections::LOGOS).await
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn bg_images(&self) -> Result<Arc<Vec<BgImage>>, CatalogError> {
        self.collection(collections::BG_IMAGES).await
    }

    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn popups(&self) -> Result<Arc<Vec<PopupMessage>>, CatalogError> {
        self.collection(collections::POPUPS).await
    }

    /// `settings/redbar`, defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    pub async fn red_bar(&self) -> Result<Arc<RedBar>, CatalogError> {
        self.setting(collections::settings::REDBAR).await
    }

    /// `settings/footer`, defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    pub async fn footer(&self) -> Result<Arc<Footer>, CatalogError> {
        self.setting(collections::settings::FOOTER).await
    }

    /// `settings/popup`, defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    pub async fn popup_settings(&self) -> Result<Arc<PopupSettings>, CatalogError> {
        self.setting(collections::settings::POPUP).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use camrent_firebase::{MemoryDatastore, to_fields};
    use serde_json::json;

    use super::*;

    async fn seeded() -> (MemoryDatastore, CatalogClient) {
        let db = MemoryDatastore::new();
        db.set(
            collections::CATEGORIES,
            "lenses",
            to_fields(&json!({"name": "Lenses", "slug": "lenses", "order": 2})).unwrap(),
        )
        .await
        .unwrap();
        db.set(
            collections::CATEGORIES,
            "cameras",
            to_fields(&json!({"name": "Cameras", "slug": "cameras", "order": 1})).unwrap(),
        )
        .await
        .unwrap();
        db.set(
            collections::PRODUCTS,
            "p1",
            to_fields(&json!({
                "name": "Sony FX3",
                "slug": "sony-fx3",
                "categoryId": "cameras",
                "pricePerDay": 85
            }))
            .unwrap(),
        )
        .await
        .unwrap();
        let client = CatalogClient::new(Arc::new(db.clone()));
        (db, client)
    }

    #[tokio::test]
    async fn test_categories_sorted_by_order() {
        let (_, client) = seeded().await;
        let names: Vec<String> = client
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Cameras", "Lenses"]);
    }

    #[tokio::test]
    async fn test_product_by_slug_or_id() {
        let (_, client) = seeded().await;
        assert_eq!(
            client.product_by_slug("sony-fx3").await.unwrap().unwrap().id.as_str(),
            "p1"
        );
        assert!(client.product_by_slug("p1").await.unwrap().is_some());
        assert!(client.product_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_settings_render_defaults() {
        let (_, client) = seeded().await;
        assert_eq!(*client.red_bar().await.unwrap(), RedBar::default());
        assert_eq!(*client.popup_settings().await.unwrap(), PopupSettings::default());
    }

    #[tokio::test]
    async fn test_reads_are_cached_until_invalidated() {
        let (db, client) = seeded().await;
        assert_eq!(client.products().await.unwrap().len(), 1);

        db.delete(collections::PRODUCTS, "p1").await.unwrap();
        assert_eq!(client.products().await.unwrap().len(), 1);

        client.invalidate_all();
        assert!(client.products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_product_does_not_hide_the_rest() {
        let (db, client) = seeded().await;
        db.set(
            collections::PRODUCTS,
            "legacy",
            to_fields(&json!({"name": "FX3", "pricePerDay": 12})).unwrap(),
        )
        .await
        .unwrap();

        let products = client.products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id.as_str(), "p1");
        assert!(client.product_by_slug("legacy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_category_is_skipped() {
        let (db, client) = seeded().await;
        db.set(
            collections::CATEGORIES,
            "broken",
            to_fields(&json!({"slug": "broken", "order": 0})).unwrap(),
        )
        .await
        .unwrap();

        let names: Vec<String> = client
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Cameras", "Lenses"]);
    }
}
