//! Catalog and product detail handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use camrent_core::catalog::{self, CatalogFilter, PER_PAGE, Sort};
use camrent_core::models::{Brand, Category, Product, ProductSpec};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::services::users;
use crate::state::AppState;

const RELATED_LIMIT: usize = 4;

/// Product card shown in grids.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub price: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            image: product.cover_image().map(String::from),
            price: product.daily_price().display(),
            in_stock: product.in_stock,
        }
    }
}

/// An `<option>` in a filter select.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

/// Filter form state, echoed back into the catalog page.
pub struct FilterView {
    pub category: String,
    pub brand: String,
    pub q: String,
    pub in_stock: bool,
    pub min_price: String,
    pub max_price: String,
    pub sort: &'static str,
}

impl From<&CatalogFilter> for FilterView {
    fn from(filter: &CatalogFilter) -> Self {
        Self {
            category: filter.category.as_ref().map(ToString::to_string).unwrap_or_default(),
            brand: filter.brand.as_ref().map(ToString::to_string).unwrap_or_default(),
            q: filter.query.clone().unwrap_or_default(),
            in_stock: filter.in_stock,
            min_price: filter.min_price.map(|p| p.to_string()).unwrap_or_default(),
            max_price: filter.max_price.map(|p| p.to_string()).unwrap_or_default(),
            sort: filter.sort.as_str(),
        }
    }
}

impl FilterView {
    /// Query string for another page of the same listing.
    #[must_use]
    pub fn page_query(&self, page: usize) -> String {
        let mut pairs: Vec<(&str, &str)> = vec![
            ("category", &self.category),
            ("brand", &self.brand),
            ("q", &self.q),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
        ];
        if self.in_stock {
            pairs.push(("in_stock", "on"));
        }
        if self.sort != Sort::default().as_str() {
            pairs.push(("sort", self.sort));
        }

        let mut query: String = pairs
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}={}&", urlencoding::encode(value)))
            .collect();
        query.push_str(&format!("page={page}"));
        query
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct CatalogTemplate {
    pub ctx: PageContext,
    pub heading: String,
    /// Form target: `/products` or `/categories/{slug}`.
    pub action: String,
    pub products: Vec<ProductCard>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub filter: FilterView,
    /// Empty on category pages, where the URL fixes the category.
    pub category_options: Vec<SelectOption>,
    pub brand_options: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub ctx: PageContext,
    pub product: ProductCard,
    pub description: String,
    pub images: Vec<String>,
    pub specs: Vec<ProductSpec>,
    pub deposit: Option<String>,
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub related: Vec<ProductCard>,
    pub is_favorite: bool,
    pub whatsapp: Option<String>,
}

async fn render_catalog(
    state: &AppState,
    ctx: PageContext,
    filter: &CatalogFilter,
    heading: String,
    action: String,
    category_locked: bool,
) -> Result<CatalogTemplate> {
    let catalog = state.catalog();
    let (products, brands) = tokio::try_join!(catalog.products(), catalog.brands())?;

    let matched = catalog::apply(&products, filter);
    let page = catalog::paginate(matched, filter.page.unwrap_or(1), PER_PAGE);

    let filter_view = FilterView::from(filter);
    let category_options = if category_locked {
        Vec::new()
    } else {
        ctx.categories
            .iter()
            .map(|c| SelectOption::new(c.id.as_str(), &c.name, &filter_view.category))
            .collect()
    };
    let mut brands: Vec<&Brand> = brands.iter().collect();
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    let brand_options = brands
        .into_iter()
        .map(|b| SelectOption::new(b.id.as_str(), &b.name, &filter_view.brand))
        .collect();
    let sort_options = Sort::ALL
        .iter()
        .map(|(sort, label)| SelectOption::new(sort.as_str(), *label, filter_view.sort))
        .collect();

    Ok(CatalogTemplate {
        ctx,
        heading,
        action,
        has_previous: page.has_previous(),
        has_next: page.has_next(),
        products: page.items.iter().map(ProductCard::from).collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        filter: filter_view,
        category_options,
        brand_options,
        sort_options,
    })
}

/// Catalog with filters, sorting and pagination.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(filter): Query<CatalogFilter>,
) -> Result<CatalogTemplate> {
    render_catalog(
        &state,
        ctx,
        &filter,
        "All equipment".to_string(),
        "/products".to_string(),
        false,
    )
    .await
}

/// Catalog pre-filtered by category slug.
#[instrument(skip(state, ctx, filter))]
pub async fn category(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
    Query(mut filter): Query<CatalogFilter>,
) -> Result<CatalogTemplate> {
    let category = ctx
        .categories
        .iter()
        .find(|c| c.slug == slug)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Category {slug}")))?;

    filter.category = Some(category.id.clone());
    render_catalog(
        &state,
        ctx,
        &filter,
        category.name,
        format!("/categories/{slug}"),
        true,
    )
    .await
}

/// Product detail with related products from the same category.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    ctx: PageContext,
    Path(slug): Path<String>,
) -> Result<ProductTemplate> {
    let catalog = state.catalog();
    let product = catalog
        .product_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {slug}")))?;

    let (products, brands) = tokio::try_join!(catalog.products(), catalog.brands())?;
    let related = catalog::related(&products, &product, RELATED_LIMIT);

    let is_favorite = match &ctx.customer {
        Some(customer) => users::load_profile(state.db(), &customer.uid)
            .await?
            .is_some_and(|profile| profile.favorites.contains(&product.id)),
        None => false,
    };

    let category = ctx
        .categories
        .iter()
        .find(|c| c.id == product.category_id)
        .cloned();
    let brand = product
        .brand_id
        .as_ref()
        .and_then(|id| brands.iter().find(|b| &b.id == id))
        .map(|b| b.name.clone());
    let whatsapp = ctx
        .footer
        .whatsapp_link(Some(&format!("Hi! I'd like to rent the {}.", product.name)));

    Ok(ProductTemplate {
        product: ProductCard::from(&product),
        description: product.description.clone(),
        images: product.images.clone(),
        specs: product.specs.clone(),
        deposit: product
            .deposit
            .map(|d| camrent_core::Price::usd(d).display()),
        category,
        brand,
        related: related.iter().map(ProductCard::from).collect(),
        is_favorite,
        whatsapp,
        ctx,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_page_query_keeps_filters() {
        let filter = CatalogFilter {
            query: Some("sony a7".to_string()),
            in_stock: true,
            max_price: Some(Decimal::new(100, 0)),
            sort: Sort::PriceAsc,
            ..CatalogFilter::default()
        };
        let query = FilterView::from(&filter).page_query(2);
        assert_eq!(
            query,
            format!(
                "q=sony%20a7&max_price=100&in_stock=on&sort={}&page=2",
                Sort::PriceAsc.as_str()
            )
        );
    }

    #[test]
    fn test_page_query_without_filters() {
        assert_eq!(FilterView::from(&CatalogFilter::default()).page_query(3), "page=3");
    }
}
