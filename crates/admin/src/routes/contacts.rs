//! Contact submissions from the storefront.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use camrent_core::SubmissionId;
use camrent_core::models::{ContactSubmission, Product, collections};
use camrent_firebase::{Direction, Query as DocQuery, to_fields};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::{info, instrument};

use super::redirect_with;
use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminPage, RequireAdminAuth};
use crate::models::Flash;
use crate::services::records;
use crate::state::AppState;

/// Listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Open,
    Handled,
}

impl StatusFilter {
    #[must_use]
    pub const fn matches(self, submission: &ContactSubmission) -> bool {
        match self {
            Self::All => true,
            Self::Open => !submission.handled,
            Self::Handled => submission.handled,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactsQuery {
    #[serde(default)]
    pub status: StatusFilter,
}

/// A submission with the name of the product it asks about.
#[derive(Debug, Clone)]
pub struct SubmissionRow {
    pub submission: ContactSubmission,
    pub product_name: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "contacts/index.html")]
pub struct ContactsTemplate {
    pub page: AdminPage,
    pub rows: Vec<SubmissionRow>,
    pub status: StatusFilter,
}

impl ContactsTemplate {
    #[must_use]
    pub fn is_status(&self, status: &str) -> bool {
        matches!(
            (self.status, status),
            (StatusFilter::All, "all") | (StatusFilter::Open, "open") | (StatusFilter::Handled, "handled")
        )
    }
}

/// Newest first.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    page: AdminPage,
    Query(query): Query<ContactsQuery>,
) -> Result<ContactsTemplate> {
    let db = state.db();
    let submissions_query = DocQuery::collection(collections::CONTACT_SUBMISSIONS)
        .order_by("createdAt", Direction::Descending);
    let products_query = DocQuery::collection(collections::PRODUCTS);
    let (submissions, products) = tokio::try_join!(
        db.fetch_all::<ContactSubmission>(&submissions_query),
        db.fetch_all::<Product>(&products_query),
    )?;

    let rows = submissions
        .into_iter()
        .filter(|s| query.status.matches(s))
        .map(|submission| {
            let product_name = submission.product_id.as_ref().and_then(|id| {
                products.iter().find(|p| &p.id == id).map(|p| p.name.clone())
            });
            SubmissionRow {
                submission,
                product_name,
            }
        })
        .collect();

    Ok(ContactsTemplate {
        page,
        rows,
        status: query.status,
    })
}

/// Flip the handled flag.
#[instrument(skip(state, session, _admin))]
pub async fn toggle_handled(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<SubmissionId>,
) -> Result<Redirect> {
    let submission: ContactSubmission =
        records::require(&state, collections::CONTACT_SUBMISSIONS, id.as_str()).await?;
    let handled = !submission.handled;
    state
        .db()
        .update(
            collections::CONTACT_SUBMISSIONS,
            id.as_str(),
            to_fields(&json!({ "handled": handled }))?,
        )
        .await?;
    info!(handled, "Submission updated");

    let message = if handled {
        "Marked as handled"
    } else {
        "Marked as open"
    };
    Ok(redirect_with(&session, Flash::success(message), "/contacts").await)
}

#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<SubmissionId>,
) -> Result<Redirect> {
    state
        .db()
        .delete(collections::CONTACT_SUBMISSIONS, id.as_str())
        .await?;
    info!("Submission deleted");
    Ok(redirect_with(&session, Flash::success("Submission deleted"), "/contacts").await)
}
