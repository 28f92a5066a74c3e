//! Cart and checkout handlers.
//!
//! Cart mutations are htmx requests: `add` answers with the count badge and
//! the others with the cart lines fragment, all with an `HX-Trigger:
//! cart-updated` header so the header badge refreshes. Plain form posts
//! (JavaScript disabled) are redirected to the cart page instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use camrent_core::ProductId;
use camrent_core::cart::{self, PricedCart};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, is_htmx};
use crate::services::cart::{self as cart_service, CartOwner};
use crate::state::AppState;

const CART_UPDATED: (&str, &str) = ("HX-Trigger", "cart-updated");

#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub ctx: PageContext,
    pub cart: PricedCart,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: PricedCart,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub cart: PricedCart,
    pub whatsapp: Option<String>,
}

#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<CartTemplate> {
    let owner = CartOwner::of(ctx.customer.as_ref());
    let cart = cart_service::load(state.db(), &session, owner).await?;
    let cart = cart_service::priced(state.catalog(), &cart).await?;
    Ok(CartTemplate { ctx, cart })
}

#[instrument(skip(state, session, customer, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    if state.catalog().product(&form.product_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Unknown product {}",
            form.product_id
        )));
    }

    let owner = CartOwner::of(customer.as_ref());
    let mut cart = cart_service::load(state.db(), &session, owner).await?;
    cart.add(
        form.product_id.clone(),
        form.quantity.unwrap_or(1),
        form.days.unwrap_or(1),
    );
    cart_service::save(state.db(), &session, owner, &cart).await?;
    info!(product_id = %form.product_id, "Added to cart");

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok((
        AppendHeaders([CART_UPDATED]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response())
}

/// Change quantity or rental days. A quantity of zero removes the line.
#[instrument(skip(state, session, customer, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let owner = CartOwner::of(customer.as_ref());
    let mut cart = cart_service::load(state.db(), &session, owner).await?;
    let changed = if form.quantity == 0 {
        cart.remove(&form.product_id)
    } else {
        cart.update(&form.product_id, form.quantity, form.days)
    };
    if changed {
        cart_service::save(state.db(), &session, owner, &cart).await?;
    }
    cart_fragment(&state, &headers, &cart).await
}

#[instrument(skip(state, session, customer, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let owner = CartOwner::of(customer.as_ref());
    let mut cart = cart_service::load(state.db(), &session, owner).await?;
    if cart.remove(&form.product_id) {
        cart_service::save(state.db(), &session, owner, &cart).await?;
    }
    cart_fragment(&state, &headers, &cart).await
}

async fn cart_fragment(state: &AppState, headers: &HeaderMap, cart: &cart::Cart) -> Result<Response> {
    if !is_htmx(headers) {
        return Ok(Redirect::to("/cart").into_response());
    }
    let cart = cart_service::priced(state.catalog(), cart).await?;
    Ok((AppendHeaders([CART_UPDATED]), CartItemsTemplate { cart }).into_response())
}

/// Header badge.
#[instrument(skip(state, session, customer))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
) -> Result<CartCountTemplate> {
    let cart = cart_service::load(state.db(), &session, CartOwner::of(customer.as_ref())).await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

/// Rental request hand-off.
///
/// There is no payment step: the customer sends the priced cart to the shop
/// on WhatsApp, or through the contact form when no number is configured.
#[instrument(skip(state, session, ctx))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<Response> {
    let owner = CartOwner::of(ctx.customer.as_ref());
    let cart = cart_service::load(state.db(), &session, owner).await?;
    let cart = cart_service::priced(state.catalog(), &cart).await?;
    if cart.lines.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let whatsapp = ctx.footer.whatsapp_link(Some(&cart::summary_text(&cart)));
    Ok(CheckoutTemplate { ctx, cart, whatsapp }.into_response())
}
