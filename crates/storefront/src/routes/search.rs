//! Search page and search-as-you-type fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::services::search::{self, MIN_SUGGEST_LENGTH, SearchResult};
use crate::state::AppState;

const PAGE_RESULTS: usize = 24;
const SUGGEST_RESULTS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[derive(Template, WebTemplate)]
#[template(path = "partials/suggest.html")]
pub struct SuggestTemplate {
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<SearchTemplate> {
    let results = search::search(state.search(), state.catalog(), &query.q, PAGE_RESULTS).await?;
    Ok(SearchTemplate {
        ctx,
        query: query.q.trim().to_string(),
        results,
    })
}

/// Suggestions for the header search box. Queries shorter than two
/// characters render an empty list.
#[instrument(skip(state))]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<SuggestTemplate> {
    let q = query.q.trim();
    let results = if q.chars().count() < MIN_SUGGEST_LENGTH {
        Vec::new()
    } else {
        search::search(state.search(), state.catalog(), q, SUGGEST_RESULTS).await?
    };
    Ok(SuggestTemplate {
        query: q.to_string(),
        results,
    })
}
