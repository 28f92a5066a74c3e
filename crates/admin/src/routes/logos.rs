//! Partner logo strip. Logos are created or deleted, never edited.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::LogoId;
use camrent_core::models::{Logo, collections};
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

#[derive(Template, WebTemplate)]
#[template(path = "logos/index.html")]
pub struct LogosTemplate {
    pub page: AdminPage,
    pub logos: Vec<Logo>,
}

#[derive(Template, WebTemplate)]
#[template(path = "logos/form.html")]
pub struct LogoFormTemplate {
    pub page: AdminPage,
    pub name: String,
    pub link: String,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<LogosTemplate> {
    let logos = state
        .db()
        .fetch_all(&Query::collection(collections::LOGOS))
        .await?;
    Ok(LogosTemplate { page, logos })
}

pub async fn new_logo(State(state): State<AppState>, page: AdminPage) -> LogoFormTemplate {
    LogoFormTemplate {
        page,
        name: String::new(),
        link: String::new(),
        error: None,
        uploads_enabled: state.storage().is_some(),
    }
}

async fn build(state: &AppState, form: &FormData) -> Result<Logo> {
    let name = form.required("name", "Name")?;
    let (image, _) = images::resolve_required(state, form, "logos", None).await?;
    Ok(Logo {
        id: LogoId::default(),
        name,
        image,
        link: form.optional("link"),
    })
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let logo = match build(&state, &form).await {
        Ok(logo) => logo,
        Err(e) => {
            return Ok(invalid(LogoFormTemplate {
                page,
                name: form.text("name"),
                link: form.text("link"),
                error: Some(e.form_message()?),
                uploads_enabled: state.storage().is_some(),
            }));
        }
    };

    let id = state.db().insert(collections::LOGOS, &logo).await?;
    info!(logo_id = %id, "Logo created");
    Ok(redirect_with(&session, Flash::success("Logo added"), "/logos")
        .await
        .into_response())
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<LogoId>,
) -> Result<Response> {
    let logo: Logo = records::require(&state, collections::LOGOS, id.as_str()).await?;
    state.db().delete(collections::LOGOS, id.as_str()).await?;
    images::discard(&state, [logo.image.as_str()]).await;
    info!("Logo deleted");
    Ok(redirect_with(&session, Flash::success("Logo deleted"), "/logos")
        .await
        .into_response())
}
