//! Home-page banner management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::BannerId;
use camrent_core::models::{Banner, collections};
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

const FOLDER: &str = "banners";

/// Values shown in the form.
#[derive(Debug, Clone, Default)]
pub struct BannerValues {
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    pub link: String,
    pub order: String,
    pub active: bool,
}

impl From<&Banner> for BannerValues {
    fn from(banner: &Banner) -> Self {
        Self {
            title: banner.title.clone(),
            subtitle: banner.subtitle.clone().unwrap_or_default(),
            image: Some(banner.image.clone()),
            link: banner.link.clone().unwrap_or_default(),
            order: banner.order.to_string(),
            active: banner.active,
        }
    }
}

impl BannerValues {
    fn resubmitted(form: &FormData, current: Option<&Banner>) -> Self {
        Self {
            title: form.text("title"),
            subtitle: form.text("subtitle"),
            image: current.map(|b| b.image.clone()),
            link: form.text("link"),
            order: form.text("order"),
            active: form.checked("active"),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "banners/index.html")]
pub struct BannersTemplate {
    pub page: AdminPage,
    pub banners: Vec<Banner>,
}

#[derive(Template, WebTemplate)]
#[template(path = "banners/form.html")]
pub struct BannerFormTemplate {
    pub page: AdminPage,
    pub heading: String,
    pub action: String,
    pub values: BannerValues,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

impl BannerFormTemplate {
    fn new(state: &AppState, page: AdminPage, id: Option<&BannerId>, values: BannerValues) -> Self {
        let (heading, action) = match id {
            Some(id) => ("Edit banner".to_string(), format!("/banners/{id}")),
            None => ("New banner".to_string(), "/banners".to_string()),
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

async fn build(state: &AppState, form: &FormData, current: Option<&Banner>) -> Result<(Banner, Option<String>)> {
    let title = form.required("title", "Title")?;
    let order = form.integer("order", "Order")?.unwrap_or(0);
    let (image, discarded) =
        images::resolve_required(state, form, FOLDER, current.map(|b| b.image.as_str())).await?;
    let banner = Banner {
        id: current.map(|b| b.id.clone()).unwrap_or_default(),
        title,
        subtitle: form.optional("subtitle"),
        image,
        link: form.optional("link"),
        order,
        active: form.checked("active"),
    };
    Ok((banner, discarded))
}

#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<BannersTemplate> {
    // Sorted here: a Firestore order_by would drop documents without `order`.
    let mut banners: Vec<Banner> = state
        .db()
        .fetch_all(&Query::collection(collections::BANNERS))
        .await?;
    banners.sort_by_key(|b| b.order);
    Ok(BannersTemplate { page, banners })
}

pub async fn new_banner(State(state): State<AppState>, page: AdminPage) -> BannerFormTemplate {
    let values = BannerValues {
        active: true,
        order: "0".to_string(),
        ..BannerValues::default()
    };
    BannerFormTemplate::new(&state, page, None, values)
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let banner = match build(&state, &form, None).await {
        Ok((banner, _)) => banner,
        Err(e) => {
            let mut page = BannerFormTemplate::new(&state, page, None, BannerValues::resubmitted(&form, None));
            page.error = Some(e.form_message()?);
            return Ok(invalid(page));
        }
    };

    let id = state.db().insert(collections::BANNERS, &banner).await?;
    info!(banner_id = %id, "Banner created");
    Ok(redirect_with(&session, Flash::success("Banner created"), "/banners")
        .await
        .into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<BannerId>,
) -> Result<BannerFormTemplate> {
    let banner: Banner = records::require(&state, collections::BANNERS, id.as_str()).await?;
    Ok(BannerFormTemplate::new(&state, page, Some(&id), BannerValues::from(&banner)))
}

#[instrument(skip(state, session, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Path(id): Path<BannerId>,
    multipart: Multipart,
) -> Result<Response> {
    let current: Banner = records::require(&state, collections::BANNERS, id.as_str()).await?;
    let form = FormData::read(multipart).await?;
    let (banner, discarded) = match build(&state, &form, Some(&current)).await {
        Ok(built) => built,
        Err(e) => {
            let values = BannerValues::resubmitted(&form, Some(&current));
            let mut page = BannerFormTemplate::new(&state, page, Some(&id), values);
            page.error = Some(e.form_message()?);
            return Ok(invalid(page));
        }
    };

    state.db().put(collections::BANNERS, id.as_str(), &banner).await?;
    images::discard(&state, discarded).await;
    info!("Banner updated");
    Ok(redirect_with(&session, Flash::success("Banner saved"), "/banners")
        .await
        .into_response())
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<BannerId>,
) -> Result<Response> {
    let banner: Banner = records::require(&state, collections::BANNERS, id.as_str()).await?;
    state.db().delete(collections::BANNERS, id.as_str()).await?;
    images::discard(&state, [banner.image.as_str()]).await;
    info!("Banner deleted");
    Ok(redirect_with(&session, Flash::success("Banner deleted"), "/banners")
        .await
        .into_response())
}
