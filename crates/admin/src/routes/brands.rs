//! Brand management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::BrandId;
use camrent_core::models::{Brand, collections};
use camrent_firebase::Query;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::{invalid, redirect_with};
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdminAuth};
use crate::models::Flash;
use crate::services::form::FormData;
use crate::services::{images, records};
use crate::state::AppState;

const FOLDER: &str = "brands";

#[derive(Template, WebTemplate)]
#[template(path = "brands/index.html")]
pub struct BrandsTemplate {
    pub page: AdminPage,
    pub brands: Vec<Brand>,
}

#[derive(Template, WebTemplate)]
#[template(path = "brands/form.html")]
pub struct BrandFormTemplate {
    pub page: AdminPage,
    pub heading: String,
    pub action: String,
    pub name: String,
    pub logo: Option<String>,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

impl BrandFormTemplate {
    fn new(state: &AppState, page: AdminPage, brand: Option<&Brand>) -> Self {
        let (heading, action) = match brand {
            Some(b) => (format!("Edit {}", b.name), format!("/brands/{}", b.id)),
            None => ("New brand".to_string(), "/brands".to_string()),
        };
        Self {
            page,
            heading,
            action,
            name: brand.map(|b| b.name.clone()).unwrap_or_default(),
            logo: brand.and_then(|b| b.logo.clone()),
            error: None,
            uploads_enabled: state.storage().is_some(),
        }
    }

    fn rejected(mut self, form: &FormData, error: String) -> Self {
        self.name = form.text("name");
        self.error = Some(error);
        self
    }
}

async fn build(state: &AppState, form: &FormData, current: Option<&Brand>) -> Result<(Brand, Option<String>)> {
    let name = form.required("name", "Name")?;
    let logo = images::resolve_single(state, form, FOLDER, current.and_then(|b| b.logo.as_deref())).await?;
    let brand = Brand {
        id: current.map(|b| b.id.clone()).unwrap_or_default(),
        name,
        logo: logo.url,
    };
    Ok((brand, logo.discarded))
}

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<BrandsTemplate> {
    let mut brands: Vec<Brand> = state
        .db()
        .fetch_all(&Query::collection(collections::BRANDS))
        .await?;
    brands.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(BrandsTemplate { page, brands })
}

pub async fn new_brand(State(state): State<AppState>, page: AdminPage) -> BrandFormTemplate {
    BrandFormTemplate::new(&state, page, None)
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let brand = match build(&state, &form, None).await {
        Ok((brand, _)) => brand,
        Err(e) => {
            let page = BrandFormTemplate::new(&state, page, None);
            return Ok(invalid(page.rejected(&form, e.form_message()?)));
        }
    };

    let id = state.db().insert(collections::BRANDS, &brand).await?;
    info!(brand_id = %id, "Brand created");
    let flash = Flash::success(format!("Brand \"{}\" created", brand.name));
    Ok(redirect_with(&session, flash, "/brands").await.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<BrandId>,
) -> Result<BrandFormTemplate> {
    let brand: Brand = records::require(&state, collections::BRANDS, id.as_str()).await?;
    Ok(BrandFormTemplate::new(&state, page, Some(&brand)))
}

#[instrument(skip(state, session, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Path(id): Path<BrandId>,
    multipart: Multipart,
) -> Result<Response> {
    let current: Brand = records::require(&state, collections::BRANDS, id.as_str()).await?;
    let form = FormData::read(multipart).await?;
    let (brand, discarded) = match build(&state, &form, Some(&current)).await {
        Ok(built) => built,
        Err(e) => {
            let page = BrandFormTemplate::new(&state, page, Some(&current));
            return Ok(invalid(page.rejected(&form, e.form_message()?)));
        }
    };

    state.db().put(collections::BRANDS, id.as_str(), &brand).await?;
    images::discard(&state, discarded).await;
    info!("Brand updated");
    let flash = Flash::success(format!("Brand \"{}\" saved", brand.name));
    Ok(redirect_with(&session, flash, "/brands").await.into_response())
}

/// Delete a brand no product points to.
#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<BrandId>,
) -> Result<Response> {
    let brand: Brand = records::require(&state, collections::BRANDS, id.as_str()).await?;
    if records::is_referenced(&state, collections::PRODUCTS, "brandId", id.as_str()).await? {
        let flash = Flash::error(format!("\"{}\" is still used by products", brand.name));
        return Ok(redirect_with(&session, flash, "/brands").await.into_response());
    }

    state.db().delete(collections::BRANDS, id.as_str()).await?;
    images::discard(&state, brand.logo.as_deref()).await;
    info!("Brand deleted");
    let flash = Flash::success(format!("Brand \"{}\" deleted", brand.name));
    Ok(redirect_with(&session, flash, "/brands").await.into_response())
}
