//! Keeps the Algolia product index in step with Firestore.
//!
//! Firestore is the source of truth. Index failures after a successful write
//! are logged and reported back to the handler so the flash message can say
//! search may be stale; `camrent-cli reindex` repairs the index.

use camrent_core::models::{Brand, Category, Product, collections};
use camrent_firebase::ProductRecord;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::state::AppState;

/// Whether the index is known to match the datastore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSync {
    Synced,
    /// No write-capable Algolia client is configured.
    Disabled,
    Failed,
}

impl IndexSync {
    /// Suffix for the flash message after a product write.
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::Synced | Self::Disabled => "",
            Self::Failed => " Search index update failed; run a reindex.",
        }
    }
}

/// Build the index record with category and brand names resolved.
///
/// # Errors
///
/// Returns an error if the category or brand cannot be read.
pub async fn record_for(state: &AppState, product: &Product) -> Result<ProductRecord> {
    let db = state.db();
    let category: Option<Category> = db
        .fetch(collections::CATEGORIES, product.category_id.as_str())
        .await?;
    let brand: Option<Brand> = match &product.brand_id {
        Some(id) => db.fetch(collections::BRANDS, id.as_str()).await?,
        None => None,
    };
    Ok(ProductRecord::from_product(
        product,
        category.as_ref().map_or("", |c| c.name.as_str()),
        brand.as_ref().map_or("", |b| b.name.as_str()),
    ))
}

/// Upsert one product. `product.id` must be set.
#[instrument(skip(state, product), fields(product_id = %product.id))]
pub async fn sync_product(state: &AppState, product: &Product) -> IndexSync {
    let Some(search) = state.search() else {
        return IndexSync::Disabled;
    };
    let result = match record_for(state, product).await {
        Ok(record) => search.save_objects(&[record]).await.map_err(Into::into),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => IndexSync::Synced,
        Err(e) => {
            warn!(error = %e, "Failed to index product");
            IndexSync::Failed
        }
    }
}

/// Remove one product from the index.
#[instrument(skip(state))]
pub async fn remove_product(state: &AppState, product_id: &str) -> IndexSync {
    let Some(search) = state.search() else {
        return IndexSync::Disabled;
    };
    match search.delete_object(product_id).await {
        Ok(()) => IndexSync::Synced,
        Err(e) => {
            warn!(error = %e, "Failed to remove product from index");
            IndexSync::Failed
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use camrent_core::{BrandId, CategoryId, ProductId};
    use camrent_firebase::{Datastore, MemoryDatastore, to_fields};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::config::tests::test_config;

    fn product() -> Product {
        Product {
            id: ProductId::new("p1"),
            name: "Sony FX3".to_string(),
            slug: "sony-fx3".to_string(),
            description: String::new(),
            category_id: CategoryId::new("cameras"),
            brand_id: Some(BrandId::new("sony")),
            price_per_day: Decimal::new(85, 0),
            deposit: None,
            images: vec![],
            specs: vec![],
            in_stock: true,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_record_denormalizes_names() {
        let db = MemoryDatastore::new();
        db.set(
            collections::CATEGORIES,
            "cameras",
            to_fields(&json!({"name": "Cameras"})).unwrap(),
        )
        .await
        .unwrap();
        db.set(collections::BRANDS, "sony", to_fields(&json!({"name": "Sony"})).unwrap())
            .await
            .unwrap();
        let state = AppState::new(test_config(), Arc::new(db), None, None, None);

        let record = record_for(&state, &product()).await.unwrap();
        assert_eq!(record.object_id, "p1");
        assert_eq!(record.category, "Cameras");
        assert_eq!(record.brand, "Sony");
    }

    #[tokio::test]
    async fn test_sync_without_search_is_disabled() {
        let state = AppState::new(test_config(), Arc::new(MemoryDatastore::new()), None, None, None);
        assert_eq!(sync_product(&state, &product()).await, IndexSync::Disabled);
        assert_eq!(remove_product(&state, "p1").await, IndexSync::Disabled);
        assert_eq!(IndexSync::Disabled.notice(), "");
    }
}
