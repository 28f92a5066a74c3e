//! Data every storefront page renders around its own content.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use camrent_core::models::{Category, Footer, PopupSettings, RedBar};
use tower_sessions::Session;

use super::CspNonce;
use crate::error::AppError;
use crate::models::{CurrentCustomer, Flash, session_keys};
use crate::services::cart::{self, CartOwner};
use crate::state::AppState;

/// Layout data: red bar, navigation, footer, cart badge, flash message.
///
/// Extracted per request; settings come from the catalog cache.
pub struct PageContext {
    pub nonce: String,
    pub customer: Option<CurrentCustomer>,
    pub red_bar: Arc<RedBar>,
    pub footer: Arc<Footer>,
    pub popup: Arc<PopupSettings>,
    pub categories: Vec<Category>,
    pub page_links: Vec<(String, String)>,
    pub cart_count: u32,
    pub flash: Option<Flash>,
}

impl PageContext {
    #[must_use]
    pub const fn signed_in(&self) -> bool {
        self.customer.is_some()
    }

    /// WhatsApp link from the footer settings.
    #[must_use]
    pub fn whatsapp_link(&self) -> Option<String> {
        self.footer.whatsapp_link(None)
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let nonce = parts
            .extensions
            .get::<CspNonce>()
            .map(|n| n.value().to_string())
            .unwrap_or_default();
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let customer = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await?;
        let flash = Flash::take(&session).await;

        let catalog = state.catalog();
        let (red_bar, footer, popup, categories) = tokio::try_join!(
            catalog.red_bar(),
            catalog.footer(),
            catalog.popup_settings(),
            catalog.categories(),
        )?;

        let cart_count = cart::load(state.db(), &session, CartOwner::of(customer.as_ref()))
            .await?
            .item_count();

        Ok(Self {
            nonce,
            customer,
            red_bar,
            footer,
            popup,
            categories,
            page_links: state.content().page_links(),
            cart_count,
            flash,
        })
    }
}
