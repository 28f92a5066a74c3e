//! Product search.
//!
//! Algolia answers when it is configured. If it is not, or the request fails,
//! the cached catalog is filtered in memory with the same text match the
//! catalog page uses, so search keeps working during an Algolia outage.

use camrent_core::catalog::{self, CatalogFilter};
use camrent_core::models::Product;
use camrent_firebase::{AlgoliaClient, SearchHit};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{instrument, warn};

use crate::catalog::CatalogClient;
use crate::error::Result;

/// Shortest query sent to search-as-you-type.
pub const MIN_SUGGEST_LENGTH: usize = 2;

/// One search result, whichever backend produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: String,
}

impl From<&Product> for SearchResult {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.cover_image().map(String::from),
            price: product.daily_price().display(),
        }
    }
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        let price = Decimal::from_f64(hit.price_per_day)
            .map(|amount| camrent_core::Price::usd(amount.round_dp(2)).display())
            .unwrap_or_default();
        let slug = if hit.slug.is_empty() {
            hit.object_id
        } else {
            hit.slug
        };
        Self {
            name: hit.name,
            slug,
            image: hit.image,
            price,
        }
    }
}

/// Search products by free text.
///
/// # Errors
///
/// Returns an error only if the fallback catalog read fails.
#[instrument(skip(search, catalog))]
pub async fn search(
    search: Option<&AlgoliaClient>,
    catalog: &CatalogClient,
    query: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(client) = search {
        match client.search(query, limit).await {
            Ok(hits) => return Ok(hits.into_iter().map(SearchResult::from).collect()),
            Err(e) => warn!(error = %e, "Algolia search failed, using catalog"),
        }
    }

    let products = catalog.products().await?;
    let filter = CatalogFilter {
        query: Some(query.to_string()),
        ..CatalogFilter::default()
    };
    Ok(catalog::apply(&products, &filter)
        .iter()
        .take(limit)
        .map(SearchResult::from)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use camrent_core::models::collections;
    use camrent_firebase::{Datastore, MemoryDatastore, to_fields};
    use serde_json::json;

    use super::*;

    async fn catalog() -> CatalogClient {
        let db = MemoryDatastore::new();
        for (id, name) in [("p1", "Sony FX3"), ("p2", "Canon R5"), ("p3", "Sony A7S III")] {
            db.set(
                collections::PRODUCTS,
                id,
                to_fields(&json!({
                    "name": name,
                    "slug": id,
                    "categoryId": "cameras",
                    "pricePerDay": 50
                }))
                .unwrap(),
            )
            .await
            .unwrap();
        }
        CatalogClient::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_falls_back_to_catalog() {
        let catalog = catalog().await;
        let results = search(None, &catalog, "sony", 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.name.starts_with("Sony")));
        assert_eq!(results[0].price, "$50.00");
    }

    #[tokio::test]
    async fn test_limit_and_blank_query() {
        let catalog = catalog().await;
        assert_eq!(search(None, &catalog, "sony", 1).await.unwrap().len(), 1);
        assert!(search(None, &catalog, "   ", 10).await.unwrap().is_empty());
    }

    #[test]
    fn test_hit_without_slug_links_by_id() {
        let hit = SearchHit {
            object_id: "p9".to_string(),
            name: "Rode NTG".to_string(),
            slug: String::new(),
            category: String::new(),
            brand: String::new(),
            price_per_day: 12.5,
            image: None,
        };
        let result = SearchResult::from(hit);
        assert_eq!(result.slug, "p9");
        assert_eq!(result.price, "$12.50");
    }
}
