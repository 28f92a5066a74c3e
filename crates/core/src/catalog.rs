//! Catalog filtering, sorting and pagination.
//!
//! The catalog is small enough to filter in memory after one collection read,
//! which keeps Firestore free of composite indexes.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::Product;
use crate::types::{BrandId, CategoryId};

/// Products per catalog page.
pub const PER_PAGE: usize = 12;

/// Sort orders offered in the catalog toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    Featured,
}

impl Sort {
    /// All sort options with their labels, in toolbar order.
    pub const ALL: [(Self, &'static str); 5] = [
        (Self::Newest, "Newest"),
        (Self::Featured, "Featured"),
        (Self::PriceAsc, "Price: low to high"),
        (Self::PriceDesc, "Price: high to low"),
        (Self::NameAsc, "Name"),
    ];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::Featured => "featured",
        }
    }

    /// Parse a query-string value, falling back to [`Sort::Newest`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .iter()
            .map(|(sort, _)| *sort)
            .find(|sort| sort.as_str() == value)
            .unwrap_or_default()
    }
}

/// Catalog filter parsed from the query string.
///
/// HTML forms submit empty strings for untouched fields, so every optional
/// field treats `""` as absent and an unknown sort falls back to the default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub category: Option<CategoryId>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub brand: Option<BrandId>,
    #[serde(default, alias = "q", deserialize_with = "empty_as_none")]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "checkbox")]
    pub in_stock: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_sort")]
    pub sort: Sort,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<usize>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(raw.as_deref(), Some("on" | "true" | "1")))
}

fn lenient_sort<'de, D>(deserializer: D) -> Result<Sort, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Sort::parse).unwrap_or_default())
}

impl CatalogFilter {
    fn matches(&self, product: &Product, needle: Option<&str>) -> bool {
        if let Some(category) = &self.category
            && &product.category_id != category
        {
            return false;
        }
        if let Some(brand) = &self.brand
            && product.brand_id.as_ref() != Some(brand)
        {
            return false;
        }
        if self.in_stock && !product.in_stock {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price_per_day < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price_per_day > max) {
            return false;
        }
        if let Some(needle) = needle {
            return product.name.to_lowercase().contains(needle)
                || product.description.to_lowercase().contains(needle);
        }
        true
    }
}

/// Filter and sort products.
#[must_use]
pub fn apply(products: &[Product], filter: &CatalogFilter) -> Vec<Product> {
    let needle = filter
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<Product> = products
        .iter()
        .filter(|p| filter.matches(p, needle.as_deref()))
        .cloned()
        .collect();

    matched.sort_by(|a, b| compare(filter.sort, a, b));
    matched
}

fn newest_first(a: &Product, b: &Product) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

fn compare(sort: Sort, a: &Product, b: &Product) -> Ordering {
    let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
    match sort {
        Sort::Newest => newest_first(a, b).then_with(by_name),
        Sort::PriceAsc => a.price_per_day.cmp(&b.price_per_day).then_with(by_name),
        Sort::PriceDesc => b.price_per_day.cmp(&a.price_per_day).then_with(by_name),
        Sort::NameAsc => by_name(),
        Sort::Featured => b
            .featured
            .cmp(&a.featured)
            .then_with(|| newest_first(a, b))
            .then_with(by_name),
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice a result list into a page.
///
/// Page 0 is treated as page 1 and pages past the end clamp to the last page.
/// An empty list yields a single empty page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Products in the same category, excluding the product itself.
#[must_use]
pub fn related(products: &[Product], product: &Product, limit: usize) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.id != product.id && p.category_id == product.category_id)
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::ProductId;

    fn product(id: &str, category: &str, price: i64, day: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            slug: id.to_string(),
            description: format!("{id} description"),
            category_id: CategoryId::new(category),
            brand_id: None,
            price_per_day: Decimal::from(price),
            deposit: None,
            images: Vec::new(),
            specs: Vec::new(),
            in_stock: true,
            featured: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).single(),
            updated_at: None,
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    fn sample() -> Vec<Product> {
        vec![
            product("fx3", "cameras", 80, 1),
            product("a7iv", "cameras", 50, 3),
            product("gm2470", "lenses", 30, 2),
        ]
    }

    #[test]
    fn test_default_sort_is_newest() {
        let result = apply(&sample(), &CatalogFilter::default());
        assert_eq!(names(&result), vec!["a7iv", "gm2470", "fx3"]);
    }

    #[test]
    fn test_price_sorts() {
        let mut filter = CatalogFilter {
            sort: Sort::PriceAsc,
            ..CatalogFilter::default()
        };
        assert_eq!(names(&apply(&sample(), &filter)), vec!["gm2470", "a7iv", "fx3"]);

        filter.sort = Sort::PriceDesc;
        assert_eq!(names(&apply(&sample(), &filter)), vec!["fx3", "a7iv", "gm2470"]);
    }

    #[test]
    fn test_featured_first() {
        let mut products = sample();
        products[0].featured = true;
        let filter = CatalogFilter {
            sort: Sort::Featured,
            ..CatalogFilter::default()
        };
        assert_eq!(names(&apply(&products, &filter))[0], "fx3");
    }

    #[test]
    fn test_filter_by_category_and_price() {
        let filter = CatalogFilter {
            category: Some(CategoryId::new("cameras")),
            max_price: Some(Decimal::from(60)),
            ..CatalogFilter::default()
        };
        assert_eq!(names(&apply(&sample(), &filter)), vec!["a7iv"]);
    }

    #[test]
    fn test_filter_in_stock_and_query() {
        let mut products = sample();
        products[1].in_stock = false;
        let filter = CatalogFilter {
            in_stock: true,
            query: Some("  A7IV ".to_string()),
            ..CatalogFilter::default()
        };
        assert!(apply(&products, &filter).is_empty());

        let filter = CatalogFilter {
            query: Some("GM2470".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(names(&apply(&products, &filter)), vec!["gm2470"]);
    }

    #[test]
    fn test_filter_from_json_treats_empty_as_absent() {
        let filter: CatalogFilter = serde_json::from_str(
            r#"{"category":"","min_price":" ","sort":"bogus","in_stock":"on","q":"fx","page":"2"}"#,
        )
        .unwrap();
        assert!(filter.category.is_none());
        assert!(filter.min_price.is_none());
        assert_eq!(filter.sort, Sort::Newest);
        assert!(filter.in_stock);
        assert_eq!(filter.query.as_deref(), Some("fx"));
        assert_eq!(filter.page, Some(2));
    }

    #[test]
    fn test_sort_parse_falls_back() {
        assert_eq!(Sort::parse("price_desc"), Sort::PriceDesc);
        assert_eq!(Sort::parse("bogus"), Sort::Newest);
    }

    #[test]
    fn test_paginate_clamps() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(items.clone(), 0, 10);
        assert_eq!(first.page, 1);
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(items.clone(), 99, 10);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(last.total_pages, 3);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_empty() {
        let page = paginate(Vec::<u32>::new(), 3, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_related_excludes_self() {
        let products = sample();
        let related = related(&products, &products[0], 4);
        assert_eq!(names(&related), vec!["a7iv"]);
    }
}
