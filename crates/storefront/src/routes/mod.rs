//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /popup                  - Popup fragment (htmx, 204 when disabled)
//!
//! # Catalog
//! GET  /products               - Catalog (filters, sort, pagination)
//! GET  /products/{slug}        - Product detail
//! GET  /categories/{slug}      - Catalog for one category
//! GET  /search                 - Search results
//! GET  /search/suggest         - Search-as-you-type fragment (htmx)
//!
//! # Cart (htmx fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add line (returns count badge)
//! POST /cart/update            - Update line (returns cart lines)
//! POST /cart/remove            - Remove line (returns cart lines)
//! GET  /cart/count             - Count badge
//! GET  /checkout               - Rental request hand-off
//!
//! # Contact
//! GET  /contact                - Contact form (?product=, ?cart=1)
//! POST /contact                - Store submission (rate limited)
//!
//! # Auth (POSTs rate limited)
//! GET  /auth/login, POST
//! GET  /auth/register, POST
//! POST /auth/logout
//! GET  /auth/reset, POST
//!
//! # Account (requires auth)
//! GET  /account/favorites      - Favorites list
//! POST /favorites/toggle       - Toggle favorite (returns button)
//!
//! # Content
//! GET  /pages/{slug}           - Markdown page
//! GET  /health, /health/ready
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod health;
pub mod home;
pub mod pages;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Auth routes. Only the credential-checking POSTs are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/reset", post(auth::reset))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/reset", get(auth::reset_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contact", get(contact::show))
        .merge(
            Router::new()
                .route("/contact", post(contact::submit))
                .layer(form_rate_limiter()),
        )
}

/// All storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/popup", get(home::popup))
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/categories/{slug}", get(products::category))
        .route("/search", get(search::index))
        .route("/search/suggest", get(search::suggest))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout))
        .merge(contact_routes())
        .nest("/auth", auth_routes())
        .route("/account/favorites", get(account::favorites))
        .route("/favorites/toggle", post(account::toggle))
        .route("/pages/{slug}", get(pages::show))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
