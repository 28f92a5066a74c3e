//! Contact form.
//!
//! Valid submissions are stored in `contact_submissions` with
//! `handled = false` for the admin console. Invalid ones re-render the form
//! with field errors and store nothing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::ProductId;
use camrent_core::cart;
use camrent_core::contact::{ContactForm, FieldError};
use camrent_core::models::{collections, media};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Flash;
use crate::services::cart::{self as cart_service, CartOwner};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    /// Product the enquiry is about.
    pub product: Option<ProductId>,
    /// Prefill the message with the cart summary (checkout fallback).
    pub cart: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
    pub form: ContactForm,
    pub errors: Vec<FieldError>,
    pub product_name: Option<String>,
    pub background: Option<String>,
}

impl ContactTemplate {
    /// Error message for a field, for inline rendering.
    #[must_use]
    pub fn error_for(&self, field: &str) -> Option<String> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(FieldError::message)
    }
}

async fn render(
    state: &AppState,
    ctx: PageContext,
    form: ContactForm,
    errors: Vec<FieldError>,
) -> Result<ContactTemplate> {
    let catalog = state.catalog();
    let product_name = if form.product.is_empty() {
        None
    } else {
        catalog
            .product(&ProductId::new(form.product.clone()))
            .await?
            .map(|p| p.name)
    };
    let backgrounds = catalog.bg_images().await?;
    let background = media::background_for(&backgrounds, "contact").map(|bg| bg.image.clone());

    Ok(ContactTemplate {
        ctx,
        form,
        errors,
        product_name,
        background,
    })
}

#[instrument(skip(state, session, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Query(query): Query<ContactQuery>,
) -> Result<ContactTemplate> {
    let mut form = ContactForm {
        product: query.product.map(ProductId::into_inner).unwrap_or_default(),
        ..ContactForm::default()
    };
    if let Some(customer) = &ctx.customer {
        form.email.clone_from(&customer.email);
    }
    if query.cart.is_some() {
        let owner = CartOwner::of(ctx.customer.as_ref());
        let cart = cart_service::load(state.db(), &session, owner).await?;
        let priced = cart_service::priced(state.catalog(), &cart).await?;
        if !priced.lines.is_empty() {
            form.subject = "Rental request".to_string();
            form.message = cart::summary_text(&priced);
        }
    }
    render(&state, ctx, form, Vec::new()).await
}

#[instrument(skip(state, session, ctx, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let submission = match form.validate(chrono::Utc::now()) {
        Ok(submission) => submission,
        Err(errors) => {
            let page = render(&state, ctx, form, errors).await?;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    let id = state
        .db()
        .insert(collections::CONTACT_SUBMISSIONS, &submission)
        .await?;
    info!(submission_id = %id, "Contact submission stored");

    Flash::success("Thanks! We'll get back to you shortly.")
        .set(&session)
        .await;
    Ok(Redirect::to("/contact").into_response())
}
