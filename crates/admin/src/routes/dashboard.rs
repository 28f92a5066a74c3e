//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use camrent_core::models::{ContactSubmission, collections};
use camrent_firebase::{Direction, Query};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::AdminPage;
use crate::state::AppState;

const RECENT_SUBMISSIONS: usize = 5;

/// Document counts shown as cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub products: usize,
    pub categories: usize,
    pub brands: usize,
    pub open_submissions: usize,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page: AdminPage,
    pub counts: DashboardCounts,
    pub recent: Vec<ContactSubmission>,
    pub search_enabled: bool,
    pub uploads_enabled: bool,
}

async fn count(state: &AppState, query: &Query) -> Result<usize> {
    Ok(state.db().list(query).await?.len())
}

/// Dashboard overview.
#[instrument(skip_all)]
pub async fn dashboard(State(state): State<AppState>, page: AdminPage) -> Result<DashboardTemplate> {
    let products_query = Query::collection(collections::PRODUCTS);
    let categories_query = Query::collection(collections::CATEGORIES);
    let brands_query = Query::collection(collections::BRANDS);
    let open_submissions_query =
        Query::collection(collections::CONTACT_SUBMISSIONS).where_eq("handled", false);
    let (products, categories, brands, open_submissions, recent) = tokio::try_join!(
        count(&state, &products_query),
        count(&state, &categories_query),
        count(&state, &brands_query),
        count(&state, &open_submissions_query),
        async {
            let query = Query::collection(collections::CONTACT_SUBMISSIONS)
                .order_by("createdAt", Direction::Descending)
                .limit(RECENT_SUBMISSIONS);
            Ok::<_, AppError>(state.db().fetch_all::<ContactSubmission>(&query).await?)
        },
    )?;

    Ok(DashboardTemplate {
        page,
        counts: DashboardCounts {
            products,
            categories,
            brands,
            open_submissions,
        },
        recent,
        search_enabled: state.search().is_some(),
        uploads_enabled: state.storage().is_some(),
    })
}
