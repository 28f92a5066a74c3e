//! Popup message management.
//!
//! The storefront shows the first active message once `settings/popup` is
//! enabled; that switch lives on the settings page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::PopupId;
use camrent_core::models::{PopupMessage, collections};
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

const FOLDER: &str = "popups";

#[derive(Debug, Clone, Default)]
pub struct PopupValues {
    pub title: String,
    pub message: String,
    pub image: Option<String>,
    pub link: String,
    pub active: bool,
}

impl From<&PopupMessage> for PopupValues {
    fn from(popup: &PopupMessage) -> Self {
        Self {
            title: popup.title.clone(),
            message: popup.message.clone(),
            image: popup.image.clone(),
            link: popup.link.clone().unwrap_or_default(),
            active: popup.active,
        }
    }
}

impl PopupValues {
    fn resubmitted(form: &FormData, current: Option<&PopupMessage>) -> Self {
        Self {
            title: form.text("title"),
            message: form.text("message"),
            image: current.and_then(|p| p.image.clone()),
            link: form.text("link"),
            active: form.checked("active"),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "popups/index.html")]
pub struct PopupsTemplate {
    pub page: AdminPage,
    pub popups: Vec<PopupMessage>,
}

#[derive(Template, WebTemplate)]
#[template(path = "popups/form.html")]
pub struct PopupFormTemplate {
    pub page: AdminPage,
    pub heading: String,
    pub action: String,
    pub values: PopupValues,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

impl PopupFormTemplate {
    fn new(state: &AppState, page: AdminPage, id: Option<&PopupId>, values: PopupValues) -> Self {
        let (heading, action) = match id {
            Some(id) => ("Edit popup".to_string(), format!("/popups/{id}")),
            None => ("New popup".to_string(), "/popups".to_string()),
        };
        Self {
            page,
            heading,
            action,
            values,
            error: None,
            uploads_enabled: state.storage().is_some(),
        }
    }
}

async fn build(
    state: &AppState,
    form: &FormData,
    current: Option<&PopupMessage>,
) -> Result<(PopupMessage, Option<String>)> {
    let title = form.required("title", "Title")?;
    let message = form.required("message", "Message")?;
    let image = images::resolve_single(state, form, FOLDER, current.and_then(|p| p.image.as_deref())).await?;
    let popup = PopupMessage {
        id: current.map(|p| p.id.clone()).unwrap_or_default(),
        title,
        message,
        image: image.url,
        link: form.optional("link"),
        active: form.checked("active"),
    };
    Ok((popup, image.discarded))
}

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<PopupsTemplate> {
    let popups = state
        .db()
        .fetch_all(&Query::collection(collections::POPUPS))
        .await?;
    Ok(PopupsTemplate { page, popups })
}

pub async fn new_popup(State(state): State<AppState>, page: AdminPage) -> PopupFormTemplate {
    let values = PopupValues {
        active: true,
        ..PopupValues::default()
    };
    PopupFormTemplate::new(&state, page, None, values)
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let popup = match build(&state, &form, None).await {
        Ok((popup, _)) => popup,
        Err(e) => {
            let mut page = PopupFormTemplate::new(&state, page, None, PopupValues::resubmitted(&form, None));
            page.error = Some(e.form_message()?);
            return Ok(invalid(page));
        }
    };

    let id = state.db().insert(collections::POPUPS, &popup).await?;
    info!(popup_id = %id, "Popup created");
    Ok(redirect_with(&session, Flash::success("Popup created"), "/popups")
        .await
        .into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<PopupId>,
) -> Result<PopupFormTemplate> {
    let popup: PopupMessage = records::require(&state, collections::POPUPS, id.as_str()).await?;
    Ok(PopupFormTemplate::new(&state, page, Some(&id), PopupValues::from(&popup)))
}

#[instrument(skip(state, session, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Path(id): Path<PopupId>,
    multipart: Multipart,
) -> Result<Response> {
    let current: PopupMessage = records::require(&state, collections::POPUPS, id.as_str()).await?;
    let form = FormData::read(multipart).await?;
    let (popup, discarded) = match build(&state, &form, Some(&current)).await {
        Ok(built) => built,
        Err(e) => {
            let values = PopupValues::resubmitted(&form, Some(&current));
            let mut page = PopupFormTemplate::new(&state, page, Some(&id), values);
            page.error = Some(e.form_message()?);
            return Ok(invalid(page));
        }
    };

    state.db().put(collections::POPUPS, id.as_str(), &popup).await?;
    images::discard(&state, discarded).await;
    info!("Popup updated");
    Ok(redirect_with(&session, Flash::success("Popup saved"), "/popups")
        .await
        .into_response())
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<PopupId>,
) -> Result<Response> {
    let popup: PopupMessage = records::require(&state, collections::POPUPS, id.as_str()).await?;
    state.db().delete(collections::POPUPS, id.as_str()).await?;
    images::discard(&state, popup.image.as_deref()).await;
    info!("Popup deleted");
    Ok(redirect_with(&session, Flash::success("Popup deleted"), "/popups")
        .await
        .into_response())
}
