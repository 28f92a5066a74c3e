//! Rebuild the Algolia product index from Firestore.
//!
//! The index is cleared and refilled, so records for deleted products do not
//! linger. Search is briefly empty while the batches upload.

use std::collections::HashMap;

use camrent_core::models::{Brand, Category, Product, collections};
use camrent_firebase::{
    AlgoliaClient, AlgoliaConfig, AlgoliaError, Datastore, FirebaseError, ProductRecord, Query,
};
use thiserror::Error;
use tracing::info;

/// Records per Algolia batch request.
const BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ReindexError {
    #[error("Algolia is not configured: set ALGOLIA_APP_ID and ALGOLIA_ADMIN_KEY")]
    NotConfigured,

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirebaseError),

    #[error("Algolia error: {0}")]
    Algolia(#[from] AlgoliaError),
}

/// Write-capable client from the environment.
///
/// # Errors
///
/// Returns [`ReindexError::NotConfigured`] without an app ID or admin key.
pub fn client_from_env() -> Result<AlgoliaClient, ReindexError> {
    AlgoliaConfig::from_env()
        .map(|config| AlgoliaClient::new(&config))
        .filter(AlgoliaClient::can_write)
        .ok_or(ReindexError::NotConfigured)
}

/// Index records with category and brand names resolved.
///
/// Missing taxonomy documents index as empty names.
#[must_use]
pub fn records(products: &[Product], categories: &[Category], brands: &[Brand]) -> Vec<ProductRecord> {
    let category_names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    let brand_names: HashMap<&str, &str> = brands
        .iter()
        .map(|b| (b.id.as_str(), b.name.as_str()))
        .collect();

    products
        .iter()
        .map(|product| {
            let category = category_names
                .get(product.category_id.as_str())
                .copied()
                .unwrap_or_default();
            let brand = product
                .brand_id
                .as_ref()
                .and_then(|id| brand_names.get(id.as_str()).copied())
                .unwrap_or_default();
            ProductRecord::from_product(product, category, brand)
        })
        .collect()
}

/// Clear the index and upload every product.
///
/// # Errors
///
/// Returns an error if Firestore cannot be read or Algolia rejects a request.
pub async fn run(db: &dyn Datastore, search: &AlgoliaClient) -> Result<usize, ReindexError> {
    let products_query = Query::collection(collections::PRODUCTS);
    let categories_query = Query::collection(collections::CATEGORIES);
    let brands_query = Query::collection(collections::BRANDS);
    let (products, categories, brands) = tokio::try_join!(
        db.fetch_all::<Product>(&products_query),
        db.fetch_all::<Category>(&categories_query),
        db.fetch_all::<Brand>(&brands_query),
    )?;
    let records = records(&products, &categories, &brands);
    info!(products = records.len(), "Loaded catalog");

    search.clear().await?;
    for batch in records.chunks(BATCH_SIZE) {
        search.save_objects(batch).await?;
        info!(records = batch.len(), "Uploaded batch");
    }

    info!(records = records.len(), "Reindex complete");
    Ok(records.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use camrent_core::{BrandId, CategoryId, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, category: &str, brand: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            slug: id.to_string(),
            description: String::new(),
            category_id: CategoryId::new(category),
            brand_id: brand.map(BrandId::new),
            price_per_day: Decimal::new(85, 0),
            deposit: None,
            images: vec!["https://img/1.jpg".to_string()],
            specs: Vec::new(),
            in_stock: true,
            featured: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_records_resolve_names() {
        let categories = vec![Category {
            id: CategoryId::new("cameras"),
            name: "Cameras".to_string(),
            slug: "cameras".to_string(),
            image: None,
            order: 1,
        }];
        let brands = vec![Brand {
            id: BrandId::new("sony"),
            name: "Sony".to_string(),
            logo: None,
        }];
        let products = vec![
            product("fx3", "cameras", Some("sony")),
            product("orphan", "drones", Some("dji")),
        ];

        let records = records(&products, &categories, &brands);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].object_id, "fx3");
        assert_eq!(records[0].category, "Cameras");
        assert_eq!(records[0].brand, "Sony");
        assert_eq!(records[0].image.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(records[1].category, "");
        assert_eq!(records[1].brand, "");
    }
}
