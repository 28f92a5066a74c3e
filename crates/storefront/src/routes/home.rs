//! Home page and popup fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use camrent_core::catalog::{self, CatalogFilter};
use camrent_core::models::{Banner, Logo, PopupMessage, media};
use tracing::instrument;

use super::products::ProductCard;
use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

const FEATURED_LIMIT: usize = 8;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub banners: Vec<Banner>,
    pub featured: Vec<ProductCard>,
    pub logos: Vec<Logo>,
    pub hero_background: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/popup.html")]
pub struct PopupTemplate {
    pub popup: PopupMessage,
}

/// Banners, featured products, categories and partner logos.
///
/// Falls back to the newest products when nothing is marked featured.
#[instrument(skip(state, ctx))]
pub async fn home(State(state): State<AppState>, ctx: PageContext) -> Result<HomeTemplate> {
    let catalog = state.catalog();
    let (products, banners, logos, backgrounds) = tokio::try_join!(
        catalog.products(),
        catalog.banners(),
        catalog.logos(),
        catalog.bg_images(),
    )?;

    let newest = catalog::apply(&products, &CatalogFilter::default());
    let mut featured: Vec<ProductCard> = newest
        .iter()
        .filter(|p| p.featured)
        .take(FEATURED_LIMIT)
        .map(ProductCard::from)
        .collect();
    if featured.is_empty() {
        featured = newest.iter().take(FEATURED_LIMIT).map(ProductCard::from).collect();
    }

    Ok(HomeTemplate {
        ctx,
        banners: media::active_banners(&banners),
        featured,
        logos: logos.as_ref().clone(),
        hero_background: media::background_for(&backgrounds, "hero").map(|bg| bg.image.clone()),
    })
}

/// The active popup, if popups are enabled.
///
/// Answers `204 No Content` otherwise, which htmx leaves unswapped.
#[instrument(skip(state))]
pub async fn popup(State(state): State<AppState>) -> Result<Response> {
    let catalog = state.catalog();
    let (settings, popups) = tokio::try_join!(catalog.popup_settings(), catalog.popups())?;

    if !settings.enabled {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    Ok(popups
        .iter()
        .find(|p| p.active)
        .cloned()
        .map_or_else(
            || StatusCode::NO_CONTENT.into_response(),
            |popup| PopupTemplate { popup }.into_response(),
        ))
}
