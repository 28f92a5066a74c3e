//! Product management.
//!
//! Products are posted as multipart forms: kept image URLs arrive as repeated
//! `keep_image` fields in display order, new files under `images`. Specs are
//! edited as `Label: Value` lines. Every write is mirrored to Algolia.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Response},
};
use camrent_core::models::{Brand, Category, Product, ProductSpec, collections};
use camrent_core::{BrandId, CategoryId, ProductId, ordering};
use camrent_firebase::Query as DocQuery;
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::{invalid, redirect_with};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AdminPage, RequireAdminAuth};
use crate::models::Flash;
use crate::services::form::FormData;
use crate::services::{images, index, records};
use crate::state::AppState;

const FOLDER: &str = "products";

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

/// One row of the listing.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product: Product,
    pub category: String,
    pub brand: String,
}

/// A `<select>` option.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: &str, label: &str, current: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }
    }
}

/// Values shown in the form.
#[derive(Debug, Clone)]
pub struct ProductValues {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: String,
    pub brand_id: String,
    pub price_per_day: String,
    pub deposit: String,
    pub specs: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub featured: bool,
}

impl Default for ProductValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            category_id: String::new(),
            brand_id: String::new(),
            price_per_day: String::new(),
            deposit: String::new(),
            specs: String::new(),
            images: Vec::new(),
            in_stock: true,
            featured: false,
        }
    }
}

impl From<&Product> for ProductValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            category_id: product.category_id.to_string(),
            brand_id: product.brand_id.as_ref().map(ToString::to_string).unwrap_or_default(),
            price_per_day: product.price_per_day.to_string(),
            deposit: product.deposit.map(|d| d.to_string()).unwrap_or_default(),
            specs: format_specs(&product.specs),
            images: product.images.clone(),
            in_stock: product.in_stock,
            featured: product.featured,
        }
    }
}

impl ProductValues {
    fn resubmitted(form: &FormData) -> Self {
        Self {
            name: form.text("name"),
            slug: form.text("slug"),
            description: form.text("description"),
            category_id: form.text("category_id"),
            brand_id: form.text("brand_id"),
            price_per_day: form.text("price_per_day"),
            deposit: form.text("deposit"),
            specs: form.text("specs"),
            images: form.all("keep_image"),
            in_stock: form.checked("in_stock"),
            featured: form.checked("featured"),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub page: AdminPage,
    pub rows: Vec<ProductRow>,
    pub query: String,
    pub category_options: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub page: AdminPage,
    pub heading: String,
    pub action: String,
    pub values: ProductValues,
    pub category_options: Vec<SelectOption>,
    pub brand_options: Vec<SelectOption>,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

/// Parse `Label: Value` lines. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] naming the first line without a colon.
pub fn parse_specs(text: &str) -> Result<Vec<ProductSpec>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (label, value) = line.split_once(':').ok_or_else(|| {
                AppError::BadRequest(format!("Spec \"{line}\" must look like \"Label: Value\""))
            })?;
            Ok(ProductSpec {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

#[must_use]
pub fn format_specs(specs: &[ProductSpec]) -> String {
    specs
        .iter()
        .map(|s| format!("{}: {}", s.label, s.value))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn taxonomy(state: &AppState) -> Result<(Vec<Category>, Vec<Brand>)> {
    let db = state.db();
    let categories_query = DocQuery::collection(collections::CATEGORIES);
    let brands_query = DocQuery::collection(collections::BRANDS);
    let (categories, mut brands) = tokio::try_join!(
        db.fetch_all::<Category>(&categories_query),
        db.fetch_all::<Brand>(&brands_query),
    )?;
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((ordering::sorted(&categories), brands))
}

async fn form_page(
    state: &AppState,
    page: AdminPage,
    id: Option<&ProductId>,
    values: ProductValues,
    error: Option<String>,
) -> Result<ProductFormTemplate> {
    let (categories, brands) = taxonomy(state).await?;
    let category_options = categories
        .iter()
        .map(|c| SelectOption::new(c.id.as_str(), &c.name, &values.category_id))
        .collect();
    let brand_options = brands
        .iter()
        .map(|b| SelectOption::new(b.id.as_str(), &b.name, &values.brand_id))
        .collect();
    let (heading, action) = match id {
        Some(id) => (format!("Edit {}", values.name), format!("/products/{id}")),
        None => ("New product".to_string(), "/products".to_string()),
    };

    Ok(ProductFormTemplate {
        page,
        heading,
        action,
        values,
        category_options,
        brand_options,
        error,
        uploads_enabled: state.storage().is_some(),
    })
}

/// Build the product from the form. Uploads happen only once every text
/// field has validated.
///
/// Returns the product and the images it no longer references.
async fn build(state: &AppState, form: &FormData, current: Option<&Product>) -> Result<(Product, Vec<String>)> {
    let name = form.required("name", "Name")?;
    let own_id = current.map(|p| p.id.as_str());
    let slug = records::unique_slug(state, collections::PRODUCTS, form, &name, own_id).await?;

    let category_id = CategoryId::new(form.required("category_id", "Category")?);
    if !state.db().exists(collections::CATEGORIES, category_id.as_str()).await? {
        return Err(AppError::BadRequest("Choose an existing category".to_string()));
    }
    let brand_id = form.optional("brand_id").map(BrandId::new);
    if let Some(brand_id) = &brand_id
        && !state.db().exists(collections::BRANDS, brand_id.as_str()).await?
    {
        return Err(AppError::BadRequest("Choose an existing brand".to_string()));
    }

    let price_per_day = form
        .decimal("price_per_day", "Price per day")?
        .ok_or_else(|| AppError::BadRequest("Price per day is required".to_string()))?;
    let deposit = form.decimal("deposit", "Deposit")?;
    let specs = parse_specs(&form.text("specs"))?;

    // Only URLs the product already had may be kept.
    let previous: &[String] = current.map_or(&[], |p| p.images.as_slice());
    let mut gallery: Vec<String> = form
        .all("keep_image")
        .into_iter()
        .filter(|url| previous.contains(url))
        .collect();
    gallery.extend(images::upload_all(state, form, "images", FOLDER).await?);
    if let Some(url) = form.optional(images::IMAGE_URL) {
        gallery.push(url);
    }
    let discarded = previous
        .iter()
        .filter(|url| !gallery.contains(*url))
        .cloned()
        .collect();

    let now = Utc::now();
    let product = Product {
        id: current.map(|p| p.id.clone()).unwrap_or_default(),
        name,
        slug,
        description: form.text("description"),
        category_id,
        brand_id,
        price_per_day,
        deposit,
        images: gallery,
        specs,
        in_stock: form.checked("in_stock"),
        featured: form.checked("featured"),
        created_at: current.and_then(|p| p.created_at).or(Some(now)),
        updated_at: Some(now),
    };
    Ok((product, discarded))
}

/// Product listing, optionally filtered by name and category.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsTemplate> {
    let (categories, brands) = taxonomy(&state).await?;
    let mut products: Vec<Product> = state
        .db()
        .fetch_all(&DocQuery::collection(collections::PRODUCTS))
        .await?;

    let needle = query.q.as_deref().unwrap_or_default().trim().to_lowercase();
    let category = query.category.unwrap_or_default();
    products.retain(|p| {
        (needle.is_empty() || p.name.to_lowercase().contains(&needle))
            && (category.is_empty() || p.category_id.as_str() == category)
    });
    products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    let rows = products
        .into_iter()
        .map(|product| {
            let category = categories
                .iter()
                .find(|c| c.id == product.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            let brand = brands
                .iter()
                .find(|b| Some(&b.id) == product.brand_id.as_ref())
                .map(|b| b.name.clone())
                .unwrap_or_default();
            ProductRow {
                product,
                category,
                brand,
            }
        })
        .collect();
    let category_options = categories
        .iter()
        .map(|c| SelectOption::new(c.id.as_str(), &c.name, &category))
        .collect();

    Ok(ProductsTemplate {
        page,
        rows,
        query: query.q.unwrap_or_default(),
        category_options,
    })
}

pub async fn new_product(State(state): State<AppState>, page: AdminPage) -> Result<ProductFormTemplate> {
    form_page(&state, page, None, ProductValues::default(), None).await
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let mut product = match build(&state, &form, None).await {
        Ok((product, _)) => product,
        Err(e) => {
            let error = e.form_message()?;
            let values = ProductValues::resubmitted(&form);
            return Ok(invalid(form_page(&state, page, None, values, Some(error)).await?));
        }
    };

    let id = state.db().insert(collections::PRODUCTS, &product).await?;
    product.id = ProductId::new(id);
    info!(product_id = %product.id, "Product created");

    let synced = index::sync_product(&state, &product).await;
    let flash = Flash::success(format!("Product \"{}\" created.{}", product.name, synced.notice()));
    Ok(redirect_with(&session, flash, "/products").await.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product: Product = records::require(&state, collections::PRODUCTS, id.as_str()).await?;
    form_page(&state, page, Some(&id), ProductValues::from(&product), None).await
}

#[instrument(skip(state, session, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let current: Product = records::require(&state, collections::PRODUCTS, id.as_str()).await?;
    let form = FormData::read(multipart).await?;
    let (product, discarded) = match build(&state, &form, Some(&current)).await {
        Ok(built) => built,
        Err(e) => {
            let error = e.form_message()?;
            let mut values = ProductValues::resubmitted(&form);
            values.images.retain(|url| current.images.contains(url));
            return Ok(invalid(form_page(&state, page, Some(&id), values, Some(error)).await?));
        }
    };

    state.db().put(collections::PRODUCTS, id.as_str(), &product).await?;
    images::discard(&state, &discarded).await;
    info!(removed_images = discarded.len(), "Product updated");

    let synced = index::sync_product(&state, &product).await;
    let flash = Flash::success(format!("Product \"{}\" saved.{}", product.name, synced.notice()));
    Ok(redirect_with(&session, flash, "/products").await.into_response())
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let product: Product = records::require(&state, collections::PRODUCTS, id.as_str()).await?;
    state.db().delete(collections::PRODUCTS, id.as_str()).await?;
    images::discard(&state, &product.images).await;
    info!("Product deleted");

    let synced = index::remove_product(&state, id.as_str()).await;
    let flash = Flash::success(format!("Product \"{}\" deleted.{}", product.name, synced.notice()));
    Ok(redirect_with(&session, flash, "/products").await.into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use camrent_firebase::{Datastore, MemoryDatastore, to_fields};
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::config::tests::test_config;

    #[test]
    fn test_parse_specs() {
        let specs = parse_specs("Sensor: Full frame\n\n Mount : Sony E \nVideo: 4K: 120p").unwrap();
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[1].label, "Mount");
        assert_eq!(specs[1].value, "Sony E");
        assert_eq!(specs[2].value, "4K: 120p");
        assert!(parse_specs("no colon here").is_err());
    }

    #[test]
    fn test_format_specs_reverses_parse() {
        let text = "Sensor: Full frame\nMount: Sony E";
        assert_eq!(format_specs(&parse_specs(text).unwrap()), text);
    }

    async fn state() -> AppState {
        let db = MemoryDatastore::new();
        db.set(
            collections::CATEGORIES,
            "cameras",
            to_fields(&json!({"name": "Cameras", "slug": "cameras"})).unwrap(),
        )
        .await
        .unwrap();
        AppState::new(test_config(), Arc::new(db), None, None, None)
    }

    #[tokio::test]
    async fn test_build_validates_and_keeps_known_images() {
        let state = state().await;
        let current = Product {
            id: ProductId::new("p1"),
            name: "FX3".to_string(),
            slug: "fx3".to_string(),
            description: String::new(),
            category_id: CategoryId::new("cameras"),
            brand_id: None,
            price_per_day: Decimal::new(80, 0),
            deposit: None,
            images: vec!["https://img/a.jpg".to_string(), "https://img/b.jpg".to_string()],
            specs: vec![],
            in_stock: true,
            featured: false,
            created_at: None,
            updated_at: None,
        };
        let form = FormData::from_pairs([
            ("name", "Sony FX3"),
            ("category_id", "cameras"),
            ("price_per_day", "85"),
            ("keep_image", "https://img/b.jpg"),
            ("keep_image", "https://evil/x.jpg"),
            ("featured", "on"),
        ]);

        let (product, discarded) = build(&state, &form, Some(&current)).await.unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.slug, "sony-fx3");
        assert_eq!(product.price_per_day, Decimal::new(85, 0));
        assert_eq!(product.images, vec!["https://img/b.jpg"]);
        assert_eq!(discarded, vec!["https://img/a.jpg"]);
        assert!(product.featured);
        assert!(!product.in_stock);
        assert!(product.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_build_rejects_unknown_category() {
        let state = state().await;
        let form = FormData::from_pairs([
            ("name", "Sony FX3"),
            ("category_id", "drones"),
            ("price_per_day", "85"),
        ]);
        assert!(matches!(
            build(&state, &form, None).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
