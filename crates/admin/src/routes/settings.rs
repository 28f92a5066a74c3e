//! Site settings documents: `settings/redbar`, `settings/footer` and
//! `settings/popup`.
//!
//! Missing documents are shown with defaults; saving writes the whole
//! document.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use camrent_core::models::{Footer, PopupSettings, RedBar, collections};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::{invalid, redirect_with};
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdminAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Longest accepted popup delay.
pub const MAX_POPUP_DELAY_SECONDS: u32 = 120;

#[derive(Debug, Deserialize)]
pub struct RedBarForm {
    pub enabled: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize)]
pub struct FooterForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub instagram: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub opening_hours: String,
}

#[derive(Debug, Deserialize)]
pub struct PopupForm {
    pub enabled: Option<String>,
    #[serde(default)]
    pub delay_seconds: String,
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

impl From<RedBarForm> for RedBar {
    fn from(form: RedBarForm) -> Self {
        Self {
            enabled: form.enabled.is_some(),
            text: form.text.trim().to_string(),
            link: optional(&form.link),
        }
    }
}

impl From<FooterForm> for Footer {
    fn from(form: FooterForm) -> Self {
        Self {
            address: form.address.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form.email.trim().to_string(),
            whatsapp: optional(&form.whatsapp),
            instagram: optional(&form.instagram),
            facebook: optional(&form.facebook),
            opening_hours: optional(&form.opening_hours),
        }
    }
}

impl PopupForm {
    /// # Errors
    ///
    /// Returns a message if the delay is not a whole number of seconds
    /// between 0 and [`MAX_POPUP_DELAY_SECONDS`].
    pub fn parse(&self) -> std::result::Result<PopupSettings, String> {
        let delay_seconds = match self.delay_seconds.trim() {
            "" => PopupSettings::default().delay_seconds,
            raw => raw
                .parse::<u32>()
                .ok()
                .filter(|d| *d <= MAX_POPUP_DELAY_SECONDS)
                .ok_or_else(|| {
                    format!("Delay must be between 0 and {MAX_POPUP_DELAY_SECONDS} seconds")
                })?,
        };
        Ok(PopupSettings {
            enabled: self.enabled.is_some(),
            delay_seconds,
        })
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "settings/redbar.html")]
pub struct RedBarTemplate {
    pub page: AdminPage,
    pub red_bar: RedBar,
}

#[derive(Template, WebTemplate)]
#[template(path = "settings/footer.html")]
pub struct FooterTemplate {
    pub page: AdminPage,
    pub footer: Footer,
}

#[derive(Template, WebTemplate)]
#[template(path = "settings/popup.html")]
pub struct PopupTemplate {
    pub page: AdminPage,
    pub popup: PopupSettings,
    pub delay_input: String,
    pub max_delay: u32,
    pub error: Option<String>,
}

async fn load<T: DeserializeOwned + Default>(state: &AppState, id: &str) -> Result<T> {
    Ok(state
        .db()
        .fetch(collections::SETTINGS, id)
        .await?
        .unwrap_or_default())
}

pub async fn index() -> Redirect {
    Redirect::to("/settings/redbar")
}

pub async fn red_bar(State(state): State<AppState>, page: AdminPage) -> Result<RedBarTemplate> {
    let red_bar = load(&state, collections::settings::REDBAR).await?;
    Ok(RedBarTemplate { page, red_bar })
}

#[instrument(skip(state, session, _admin))]
pub async fn save_red_bar(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Form(form): Form<RedBarForm>,
) -> Result<Redirect> {
    let red_bar = RedBar::from(form);
    state
        .db()
        .put(collections::SETTINGS, collections::settings::REDBAR, &red_bar)
        .await?;
    info!(enabled = red_bar.enabled, "Red bar saved");
    Ok(redirect_with(&session, Flash::success("Red bar saved"), "/settings/redbar").await)
}

pub async fn footer(State(state): State<AppState>, page: AdminPage) -> Result<FooterTemplate> {
    let footer = load(&state, collections::settings::FOOTER).await?;
    Ok(FooterTemplate { page, footer })
}

#[instrument(skip(state, session, _admin))]
pub async fn save_footer(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Form(form): Form<FooterForm>,
) -> Result<Redirect> {
    state
        .db()
        .put(collections::SETTINGS, collections::settings::FOOTER, &Footer::from(form))
        .await?;
    info!("Footer saved");
    Ok(redirect_with(&session, Flash::success("Footer saved"), "/settings/footer").await)
}

pub async fn popup(State(state): State<AppState>, page: AdminPage) -> Result<PopupTemplate> {
    let popup: PopupSettings = load(&state, collections::settings::POPUP).await?;
    Ok(PopupTemplate {
        page,
        delay_input: popup.delay_seconds.to_string(),
        popup,
        max_delay: MAX_POPUP_DELAY_SECONDS,
        error: None,
    })
}

#[instrument(skip(state, session, page))]
pub async fn save_popup(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Form(form): Form<PopupForm>,
) -> Result<Response> {
    let popup = match form.parse() {
        Ok(popup) => popup,
        Err(error) => {
            return Ok(invalid(PopupTemplate {
                page,
                popup: PopupSettings {
                    enabled: form.enabled.is_some(),
                    ..PopupSettings::default()
                },
                delay_input: form.delay_seconds,
                max_delay: MAX_POPUP_DELAY_SECONDS,
                error: Some(error),
            }));
        }
    };

    state
        .db()
        .put(collections::SETTINGS, collections::settings::POPUP, &popup)
        .await?;
    info!(enabled = popup.enabled, delay = popup.delay_seconds, "Popup settings saved");
    Ok(
        redirect_with(&session, Flash::success("Popup settings saved"), "/settings/popup")
            .await
            .into_response(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_red_bar_form_trims_and_drops_empty_link() {
        let red_bar = RedBar::from(RedBarForm {
            enabled: Some("on".to_string()),
            text: "  Weekend deals ".to_string(),
            link: "  ".to_string(),
        });
        assert!(red_bar.enabled);
        assert_eq!(red_bar.text, "Weekend deals");
        assert!(red_bar.link.is_none());
    }

    #[test]
    fn test_popup_delay_bounds() {
        let form = |delay: &str| PopupForm {
            enabled: None,
            delay_seconds: delay.to_string(),
        };
        assert_eq!(form("").parse().unwrap().delay_seconds, 3);
        assert_eq!(form("10").parse().unwrap().delay_seconds, 10);
        assert!(!form("10").parse().unwrap().enabled);
        assert!(form("121").parse().is_err());
        assert!(form("-1").parse().is_err());
        assert!(form("soon").parse().is_err());
    }
}
