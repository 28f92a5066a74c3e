//! Favorites.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::{ProductId, favorites};
use serde::Deserialize;
use tracing::{info, instrument};

use super::products::ProductCard;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, is_htmx};
use crate::services::users;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub product_id: ProductId,
}

#[derive(Template, WebTemplate)]
#[template(path = "account/favorites.html")]
pub struct FavoritesTemplate {
    pub ctx: PageContext,
    pub products: Vec<ProductCard>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/favorite_button.html")]
pub struct FavoriteButtonTemplate {
    pub product_id: String,
    pub is_favorite: bool,
}

/// Favorited products still in the catalog, most recently added first.
#[instrument(skip(state, ctx, customer), fields(uid = %customer.uid))]
pub async fn favorites(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ctx: PageContext,
) -> Result<FavoritesTemplate> {
    let profile = users::load_profile(state.db(), &customer.uid)
        .await?
        .unwrap_or_default();
    let products = state.catalog().products().await?;

    let cards = profile
        .favorites
        .iter()
        .rev()
        .filter_map(|id| products.iter().find(|p| &p.id == id))
        .map(ProductCard::from)
        .collect();

    Ok(FavoritesTemplate {
        ctx,
        products: cards,
    })
}

#[instrument(skip(state, customer, headers), fields(uid = %customer.uid))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    headers: HeaderMap,
    Form(form): Form<FavoriteForm>,
) -> Result<Response> {
    let Some(product) = state.catalog().product(&form.product_id).await? else {
        return Err(AppError::BadRequest(format!(
            "Unknown product {}",
            form.product_id
        )));
    };

    let mut list = users::load_profile(state.db(), &customer.uid)
        .await?
        .map(|profile| profile.favorites)
        .unwrap_or_default();
    let is_favorite = favorites::toggle(&mut list, &product.id);
    users::save_favorites(state.db(), &customer.uid, &list).await?;
    info!(product_id = %product.id, is_favorite, "Toggled favorite");

    if !is_htmx(&headers) {
        return Ok(Redirect::to(&format!("/products/{}", product.slug)).into_response());
    }
    Ok(FavoriteButtonTemplate {
        product_id: product.id.into_inner(),
        is_favorite,
    }
    .into_response())
}
