//! Categories and brands.

use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId};

/// A product category (`categories` collection).
///
/// `order` drives the position in navigation; see [`crate::ordering`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing)]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub order: i64,
}

/// A manufacturer (`brands` collection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default, skip_serializing)]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}
