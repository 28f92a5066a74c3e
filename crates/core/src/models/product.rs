//! Rental products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId, Price, ProductId};

/// A single specification row shown on the product page ("Mount" / "Sony E").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpec {
    pub label: String,
    pub value: String,
}

/// A rentable product (`products` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing)]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    /// Written as a JSON number; strings are accepted on read.
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_day: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub deposit: Option<Decimal>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub specs: Vec<ProductSpec>,
    #[serde(default = "default_true")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

impl Product {
    /// Daily rental price.
    #[must_use]
    pub const fn daily_price(&self) -> Price {
        Price::usd(self.price_per_day)
    }

    /// First image, used for cards and search hits.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_price_is_written_as_a_number() {
        let product: Product = serde_json::from_value(json!({
            "name": "Sony FX3",
            "categoryId": "cameras",
            "pricePerDay": 12.5
        }))
        .unwrap();
        assert_eq!(product.price_per_day, Decimal::new(1250, 2));

        let stored = serde_json::to_value(&product).unwrap();
        assert!(stored["pricePerDay"].is_number());
        assert_eq!(stored["pricePerDay"].as_f64(), Some(12.5));
    }

    #[test]
    fn test_string_price_is_read() {
        let product: Product = serde_json::from_value(json!({
            "name": "DJI Mini 4",
            "categoryId": "drones",
            "pricePerDay": "40.00"
        }))
        .unwrap();
        assert_eq!(product.daily_price().display(), "$40.00");
    }
}
