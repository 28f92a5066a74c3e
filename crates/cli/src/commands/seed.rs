//! Seed Firestore from a YAML file.
//!
//! The file mirrors the Firestore document shapes (camelCase fields):
//!
//! ```yaml
//! categories:
//!   - id: cameras
//!     name: Cameras
//!     order: 1
//! brands:
//!   - id: sony
//!     name: Sony
//! products:
//!   - id: sony-fx3
//!     name: Sony FX3
//!     categoryId: cameras
//!     brandId: sony
//!     pricePerDay: 85
//! settings:
//!   redbar:
//!     enabled: true
//!     text: Free delivery in town
//! ```
//!
//! Documents with an `id` are written under that ID, so running the same file
//! twice replaces them. Documents without one get a generated ID.

use std::collections::HashSet;
use std::path::Path;

use camrent_core::models::{
    Banner, BgImage, Brand, Category, Footer, Logo, PopupMessage, PopupSettings, Product, RedBar,
    collections,
};
use camrent_core::slugify;
use camrent_firebase::{Datastore, FirebaseError, Write, auto_id, to_fields};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Firestore rejects commits with more writes than this.
const MAX_BATCH: usize = 500;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Seed file rejected:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),

    #[error("Firestore error: {0}")]
    Firestore(#[from] FirebaseError),
}

/// Singleton documents in the `settings` collection.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedSettings {
    pub redbar: Option<RedBar>,
    pub footer: Option<Footer>,
    pub popup: Option<PopupSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SeedFile {
    pub categories: Vec<Category>,
    pub brands: Vec<Brand>,
    pub products: Vec<Product>,
    pub banners: Vec<Banner>,
    pub logos: Vec<Logo>,
    pub bg_images: Vec<BgImage>,
    pub popups: Vec<PopupMessage>,
    pub settings: SeedSettings,
}

trait SeedDocument: Serialize {
    const COLLECTION: &'static str;

    fn seed_id(&self) -> &str;
}

macro_rules! seed_documents {
    ($($ty:ty => $collection:expr),* $(,)?) => {
        $(
            impl SeedDocument for $ty {
                const COLLECTION: &'static str = $collection;

                fn seed_id(&self) -> &str {
                    self.id.as_str()
                }
            }
        )*
    };
}

seed_documents! {
    Category => collections::CATEGORIES,
    Brand => collections::BRANDS,
    Product => collections::PRODUCTS,
    Banner => collections::BANNERS,
    Logo => collections::LOGOS,
    BgImage => collections::BG_IMAGES,
    PopupMessage => collections::POPUPS,
}

fn set_writes<T: SeedDocument>(items: &[T], writes: &mut Vec<Write>) -> Result<(), SeedError> {
    for item in items {
        let id = match item.seed_id() {
            "" => auto_id(),
            id => id.to_string(),
        };
        writes.push(Write::set(T::COLLECTION, &id, to_fields(item)?));
    }
    Ok(())
}

fn duplicate_ids<T: SeedDocument>(items: &[T], problems: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in items.iter().map(SeedDocument::seed_id).filter(|id| !id.is_empty()) {
        if !seen.insert(id) {
            problems.push(format!("{}: duplicate id \"{id}\"", T::COLLECTION));
        }
    }
}

async fn known(
    db: Option<&dyn Datastore>,
    seeded: &HashSet<&str>,
    collection: &str,
    id: &str,
) -> Result<bool, SeedError> {
    if seeded.contains(id) {
        return Ok(true);
    }
    match db {
        Some(db) => Ok(db.exists(collection, id).await?),
        None => Ok(false),
    }
}

impl SeedFile {
    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid seed file.
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SeedError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let seed = Self::parse(&source)?;
        info!(path = %path.display(), "Parsed seed file");
        Ok(seed)
    }

    /// Parse YAML and fill in generated values: slugs from names and product
    /// timestamps.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed YAML or unknown keys.
    pub fn parse(source: &str) -> Result<Self, SeedError> {
        let mut seed: Self = serde_yaml::from_str(source)?;
        let now = Utc::now();
        for category in &mut seed.categories {
            if category.slug.is_empty() {
                category.slug = slugify(&category.name);
            }
        }
        for product in &mut seed.products {
            if product.slug.is_empty() {
                product.slug = slugify(&product.name);
            }
            product.created_at.get_or_insert(now);
            product.updated_at = Some(now);
        }
        Ok(seed)
    }

    /// Check references and values before anything is written.
    ///
    /// Product categories and brands must be in the file or, when `db` is
    /// given, already exist.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Invalid`] listing every problem found.
    pub async fn validate(&self, db: Option<&dyn Datastore>) -> Result<(), SeedError> {
        let mut problems = Vec::new();
        duplicate_ids(&self.categories, &mut problems);
        duplicate_ids(&self.brands, &mut problems);
        duplicate_ids(&self.products, &mut problems);

        let categories: HashSet<&str> = self.categories.iter().map(|c| c.id.as_str()).collect();
        let brands: HashSet<&str> = self.brands.iter().map(|b| b.id.as_str()).collect();

        for product in &self.products {
            if product.price_per_day.is_sign_negative() {
                problems.push(format!("product \"{}\": negative pricePerDay", product.name));
            }
            if product.deposit.is_some_and(|d| d.is_sign_negative()) {
                problems.push(format!("product \"{}\": negative deposit", product.name));
            }
            let category = product.category_id.as_str();
            if !known(db, &categories, collections::CATEGORIES, category).await? {
                problems.push(format!(
                    "product \"{}\": unknown category \"{category}\"",
                    product.name
                ));
            }
            if let Some(brand) = &product.brand_id
                && !known(db, &brands, collections::BRANDS, brand.as_str()).await?
            {
                problems.push(format!("product \"{}\": unknown brand \"{brand}\"", product.name));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SeedError::Invalid(problems))
        }
    }

    /// Every write the file produces, taxonomy before products.
    ///
    /// # Errors
    ///
    /// Returns an error if a document does not serialize.
    pub fn writes(&self) -> Result<Vec<Write>, SeedError> {
        let mut writes = Vec::new();
        set_writes(&self.categories, &mut writes)?;
        set_writes(&self.brands, &mut writes)?;
        set_writes(&self.products, &mut writes)?;
        set_writes(&self.banners, &mut writes)?;
        set_writes(&self.logos, &mut writes)?;
        set_writes(&self.bg_images, &mut writes)?;
        set_writes(&self.popups, &mut writes)?;

        let settings = &self.settings;
        if let Some(red_bar) = &settings.redbar {
            writes.push(Write::set(
                collections::SETTINGS,
                collections::settings::REDBAR,
                to_fields(red_bar)?,
            ));
        }
        if let Some(footer) = &settings.footer {
            writes.push(Write::set(
                collections::SETTINGS,
                collections::settings::FOOTER,
                to_fields(footer)?,
            ));
        }
        if let Some(popup) = &settings.popup {
            writes.push(Write::set(
                collections::SETTINGS,
                collections::settings::POPUP,
                to_fields(popup)?,
            ));
        }
        Ok(writes)
    }
}

/// Log what the file contains.
pub fn report(seed: &SeedFile) {
    info!(
        categories = seed.categories.len(),
        brands = seed.brands.len(),
        products = seed.products.len(),
        banners = seed.banners.len(),
        logos = seed.logos.len(),
        bg_images = seed.bg_images.len(),
        popups = seed.popups.len(),
        "Seed file is valid"
    );
}

/// Validate, then write the file in batches.
///
/// Each batch is atomic; a failure part-way leaves earlier batches written.
/// Re-running the file is safe for documents with explicit IDs.
///
/// # Errors
///
/// Returns an error if validation fails or a commit is rejected.
pub async fn run(db: &dyn Datastore, seed: &SeedFile) -> Result<usize, SeedError> {
    seed.validate(Some(db)).await?;
    report(seed);

    let writes = seed.writes()?;
    let total = writes.len();
    let mut remaining = writes.into_iter().peekable();
    while remaining.peek().is_some() {
        let batch: Vec<Write> = remaining.by_ref().take(MAX_BATCH).collect();
        let size = batch.len();
        db.commit(batch).await?;
        info!(writes = size, "Committed batch");
    }

    info!(writes = total, "Seeding complete");
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use camrent_firebase::MemoryDatastore;
    use rust_decimal::Decimal;

    use super::*;

    const CATALOG: &str = r"
categories:
  - id: cameras
    name: Cinema Cameras
    order: 1
brands:
  - id: sony
    name: Sony
products:
  - id: sony-fx3
    name: Sony FX3
    categoryId: cameras
    brandId: sony
    pricePerDay: 85
    deposit: 1500
  - name: Aputure 600d
    categoryId: cameras
    pricePerDay: 40.5
settings:
  popup:
    enabled: true
    delaySeconds: 8
";

    #[test]
    fn test_parse_fills_slugs_and_timestamps() {
        let seed = SeedFile::parse(CATALOG).unwrap();
        assert_eq!(seed.categories[0].slug, "cinema-cameras");
        assert_eq!(seed.products[1].slug, "aputure-600d");
        assert_eq!(seed.products[1].price_per_day, Decimal::new(405, 1));
        assert!(seed.products.iter().all(|p| p.created_at.is_some()));
        assert_eq!(seed.settings.popup.as_ref().unwrap().delay_seconds, 8);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            SeedFile::parse("categorys: []"),
            Err(SeedError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_run_is_repeatable_for_explicit_ids() {
        let db = MemoryDatastore::new();
        let seed = SeedFile::parse(CATALOG).unwrap();

        assert_eq!(run(&db, &seed).await.unwrap(), 5);
        assert_eq!(db.count(collections::CATEGORIES).await, 1);
        assert_eq!(db.count(collections::PRODUCTS).await, 2);

        run(&db, &seed).await.unwrap();
        assert_eq!(db.count(collections::CATEGORIES).await, 1);
        // The product without an id is inserted again.
        assert_eq!(db.count(collections::PRODUCTS).await, 3);

        let dyn_db: &dyn Datastore = &db;
        let popup: PopupSettings = dyn_db
            .fetch(collections::SETTINGS, collections::settings::POPUP)
            .await
            .unwrap()
            .unwrap();
        assert!(popup.enabled);
    }

    #[tokio::test]
    async fn test_unknown_references_write_nothing() {
        let db = MemoryDatastore::new();
        let seed = SeedFile::parse(
            "products:\n  - name: Orphan\n    categoryId: drones\n    brandId: dji\n    pricePerDay: 10\n",
        )
        .unwrap();

        let Err(SeedError::Invalid(problems)) = run(&db, &seed).await else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("unknown category \"drones\""));
        assert_eq!(db.count(collections::PRODUCTS).await, 0);
    }

    #[tokio::test]
    async fn test_existing_category_satisfies_reference() {
        let db = MemoryDatastore::new();
        db.set(
            collections::CATEGORIES,
            "drones",
            to_fields(&serde_json::json!({"name": "Drones"})).unwrap(),
        )
        .await
        .unwrap();
        let seed =
            SeedFile::parse("products:\n  - name: Mavic\n    categoryId: drones\n    pricePerDay: 30\n")
                .unwrap();

        assert!(seed.validate(None).await.is_err());
        let db: &dyn Datastore = &db;
        assert!(seed.validate(Some(db)).await.is_ok());
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let seed = SeedFile::parse("brands:\n  - id: sony\n    name: Sony\n  - id: sony\n    name: Sony Pro\n")
            .unwrap();
        let mut problems = Vec::new();
        duplicate_ids(&seed.brands, &mut problems);
        assert_eq!(problems, vec!["brands: duplicate id \"sony\"".to_string()]);
    }
}
