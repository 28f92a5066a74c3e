//! Section background images (hero, contact).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::BgImageId;
use camrent_core::models::{BgImage, collections, media};
use camrent_firebase::Query;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::{invalid, redirect_with};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{AdminPage, RequireAdminAuth};
use crate::models::Flash;
use crate::services::form::FormData;
use crate::services::{images, records};
use crate::state::AppState;

#[derive(Template, WebTemplate)]
#[template(path = "bg_images/index.html")]
pub struct BgImagesTemplate {
    pub page: AdminPage,
    pub images: Vec<BgImage>,
}

#[derive(Template, WebTemplate)]
#[template(path = "bg_images/form.html")]
pub struct BgImageFormTemplate {
    pub page: AdminPage,
    pub placements: Vec<&'static str>,
    pub placement: String,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

impl BgImageFormTemplate {
    fn new(state: &AppState, page: AdminPage, placement: String) -> Self {
        Self {
            page,
            placements: media::PLACEMENTS.to_vec(),
            placement,
            error: None,
            uploads_enabled: state.storage().is_some(),
        }
    }

    /// Whether `option` is the selected placement.
    #[must_use]
    pub fn is_selected(&self, option: &str) -> bool {
        self.placement == option
    }
}

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<BgImagesTemplate> {
    let mut images: Vec<BgImage> = state
        .db()
        .fetch_all(&Query::collection(collections::BG_IMAGES))
        .await?;
    images.sort_by(|a, b| a.placement.cmp(&b.placement));
    Ok(BgImagesTemplate { page, images })
}

pub async fn new_bg_image(State(state): State<AppState>, page: AdminPage) -> BgImageFormTemplate {
    let placement = media::PLACEMENTS.first().copied().unwrap_or_default().to_string();
    BgImageFormTemplate::new(&state, page, placement)
}

async fn build(state: &AppState, form: &FormData) -> Result<BgImage> {
    let placement = form.required("placement", "Placement")?;
    if !media::PLACEMENTS.contains(&placement.as_str()) {
        return Err(AppError::BadRequest(format!("Unknown placement \"{placement}\"")));
    }
    let (image, _) = images::resolve_required(state, form, "backgrounds", None).await?;
    Ok(BgImage {
        id: BgImageId::default(),
        image,
        placement,
    })
}

/// Add a background. The storefront uses the first image per placement.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let image = match build(&state, &form).await {
        Ok(image) => image,
        Err(e) => {
            let mut page = BgImageFormTemplate::new(&state, page, form.text("placement"));
            page.error = Some(e.form_message()?);
            return Ok(invalid(page));
        }
    };

    let id = state.db().insert(collections::BG_IMAGES, &image).await?;
    info!(bg_image_id = %id, placement = %image.placement, "Background image created");
    Ok(redirect_with(&session, Flash::success("Background image added"), "/bg-images")
        .await
        .into_response())
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<BgImageId>,
) -> Result<Response> {
    let image: BgImage = records::require(&state, collections::BG_IMAGES, id.as_str()).await?;
    state.db().delete(collections::BG_IMAGES, id.as_str()).await?;
    images::discard(&state, [image.image.as_str()]).await;
    info!("Background image deleted");
    Ok(redirect_with(&session, Flash::success("Background image deleted"), "/bg-images")
        .await
        .into_response())
}
