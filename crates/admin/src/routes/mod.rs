//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health, /health/ready      - Liveness / readiness
//!
//! # Auth
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Firebase sign-in, admin role required
//! POST /auth/logout                - Logout
//!
//! # Dashboard
//! GET  /                           - Counts and latest contact submissions
//!
//! # Catalog (multipart forms)
//! GET  /products                   - Product listing (?q=, ?category=)
//! GET  /products/new, POST /products
//! GET  /products/{id}/edit, POST /products/{id}
//! POST /products/{id}/delete
//! GET  /categories                 - Categories in display order
//! GET  /categories/new, POST /categories
//! GET  /categories/{id}/edit, POST /categories/{id}
//! POST /categories/{id}/delete     - Rejected while products use it
//! POST /categories/{id}/move/{up|down}
//! GET  /brands ... same CRUD shape as categories, without move
//!
//! # Site media
//! /banners, /popups                - index, new, create, edit, update, delete
//! /logos, /bg-images               - index, new, create, delete
//!
//! # Settings documents
//! GET  /settings                   - Redirects to /settings/redbar
//! GET|POST /settings/redbar
//! GET|POST /settings/footer
//! GET|POST /settings/popup
//!
//! # Contact submissions
//! GET  /contacts                   - Listing (?status=open|handled)
//! POST /contacts/{id}/handled      - Toggle handled
//! POST /contacts/{id}/delete
//! ```

pub mod auth;
pub mod banners;
pub mod bg_images;
pub mod brands;
pub mod categories;
pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod logos;
pub mod popups;
pub mod products;
pub mod settings;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::models::Flash;
use crate::state::AppState;

/// Store a flash message and redirect.
pub async fn redirect_with(session: &Session, flash: Flash, to: &str) -> Redirect {
    flash.set(session).await;
    Redirect::to(to)
}

/// Re-render a form the admin has to correct.
pub fn invalid(page: impl IntoResponse) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new_product))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route("/{id}/delete", post(products::delete))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/new", get(categories::new_category))
        .route("/{id}", post(categories::update))
        .route("/{id}/edit", get(categories::edit))
        .route("/{id}/delete", post(categories::delete))
        .route("/{id}/move/{direction}", post(categories::move_category))
}

fn brand_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::index).post(brands::create))
        .route("/new", get(brands::new_brand))
        .route("/{id}", post(brands::update))
        .route("/{id}/edit", get(brands::edit))
        .route("/{id}/delete", post(brands::delete))
}

fn banner_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banners::index).post(banners::create))
        .route("/new", get(banners::new_banner))
        .route("/{id}", post(banners::update))
        .route("/{id}/edit", get(banners::edit))
        .route("/{id}/delete", post(banners::delete))
}

fn popup_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(popups::index).post(popups::create))
        .route("/new", get(popups::new_popup))
        .route("/{id}", post(popups::update))
        .route("/{id}/edit", get(popups::edit))
        .route("/{id}/delete", post(popups::delete))
}

fn logo_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(logos::index).post(logos::create))
        .route("/new", get(logos::new_logo))
        .route("/{id}/delete", post(logos::delete))
}

fn bg_image_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bg_images::index).post(bg_images::create))
        .route("/new", get(bg_images::new_bg_image))
        .route("/{id}/delete", post(bg_images::delete))
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(settings::index))
        .route("/redbar", get(settings::red_bar).post(settings::save_red_bar))
        .route("/footer", get(settings::footer).post(settings::save_footer))
        .route("/popup", get(settings::popup).post(settings::save_popup))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(contacts::index))
        .route("/{id}/handled", post(contacts::toggle_handled))
        .route("/{id}/delete", post(contacts::delete))
}

/// All admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/brands", brand_routes())
        .nest("/banners", banner_routes())
        .nest("/popups", popup_routes())
        .nest("/logos", logo_routes())
        .nest("/bg-images", bg_image_routes())
        .nest("/settings", settings_routes())
        .nest("/contacts", contact_routes())
}
