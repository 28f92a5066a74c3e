//! Category management.
//!
//! Categories are listed by `order`. Moving one swaps its `order` with the
//! neighbour's in a single atomic commit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    response::{IntoResponse, Response},
};
use camrent_core::CategoryId;
use camrent_core::models::{Category, collections};
use camrent_core::ordering::{self, Direction};
use camrent_firebase::{Query, Write, to_fields};
use serde_json::json;
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

const FOLDER: &str = "categories";

/// One row of the listing.
#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub category: Category,
    pub is_first: bool,
    pub is_last: bool,
}

/// Values shown in the form.
#[derive(Debug, Clone, Default)]
pub struct CategoryValues {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

impl From<&Category> for CategoryValues {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            image: category.image.clone(),
        }
    }
}

impl CategoryValues {
    fn resubmitted(form: &FormData, current: Option<&Category>) -> Self {
        Self {
            name: form.text("name"),
            slug: form.text("slug"),
            image: current.and_then(|c| c.image.clone()),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub page: AdminPage,
    pub rows: Vec<CategoryRow>,
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/form.html")]
pub struct CategoryFormTemplate {
    pub page: AdminPage,
    pub heading: String,
    pub action: String,
    pub values: CategoryValues,
    pub error: Option<String>,
    pub uploads_enabled: bool,
}

impl CategoryFormTemplate {
    fn new(state: &AppState, page: AdminPage, id: Option<&CategoryId>, values: CategoryValues) -> Self {
        let (heading, action) = match id {
            Some(id) => (format!("Edit {}", values.name), format!("/categories/{id}")),
            None => ("New category".to_string(), "/categories".to_string()),
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

    fn with_error(mut self, error: String) -> Self {
        self.error = Some(error);
        self
    }
}

async fn all(state: &AppState) -> Result<Vec<Category>> {
    let categories: Vec<Category> = state
        .db()
        .fetch_all(&Query::collection(collections::CATEGORIES))
        .await?;
    Ok(ordering::sorted(&categories))
}

/// Build the document from the form. `order` is left to the caller.
async fn build(state: &AppState, form: &FormData, current: Option<&Category>) -> Result<(Category, Option<String>)> {
    let name = form.required("name", "Name")?;
    let own_id = current.map(|c| c.id.as_str());
    let slug = records::unique_slug(state, collections::CATEGORIES, form, &name, own_id).await?;
    let image = images::resolve_single(state, form, FOLDER, current.and_then(|c| c.image.as_deref())).await?;

    let category = Category {
        id: current.map(|c| c.id.clone()).unwrap_or_default(),
        name,
        slug,
        image: image.url,
        order: current.map_or(0, |c| c.order),
    };
    Ok((category, image.discarded))
}

/// Categories in display order.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: AdminPage) -> Result<CategoriesTemplate> {
    let categories = all(&state).await?;
    let last = categories.len().saturating_sub(1);
    let rows = categories
        .into_iter()
        .enumerate()
        .map(|(i, category)| CategoryRow {
            category,
            is_first: i == 0,
            is_last: i == last,
        })
        .collect();
    Ok(CategoriesTemplate { page, rows })
}

pub async fn new_category(State(state): State<AppState>, page: AdminPage) -> CategoryFormTemplate {
    CategoryFormTemplate::new(&state, page, None, CategoryValues::default())
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    multipart: Multipart,
) -> Result<Response> {
    let form = FormData::read(multipart).await?;
    let (mut category, _) = match build(&state, &form, None).await {
        Ok(built) => built,
        Err(e) => {
            let values = CategoryValues::resubmitted(&form, None);
            let page = CategoryFormTemplate::new(&state, page, None, values);
            return Ok(invalid(page.with_error(e.form_message()?)));
        }
    };
    category.order = ordering::next_order(&all(&state).await?);

    let id = state.db().insert(collections::CATEGORIES, &category).await?;
    info!(category_id = %id, "Category created");
    let flash = Flash::success(format!("Category \"{}\" created", category.name));
    Ok(redirect_with(&session, flash, "/categories").await.into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    page: AdminPage,
    Path(id): Path<CategoryId>,
) -> Result<CategoryFormTemplate> {
    let category: Category = records::require(&state, collections::CATEGORIES, id.as_str()).await?;
    let values = CategoryValues::from(&category);
    Ok(CategoryFormTemplate::new(&state, page, Some(&id), values))
}

#[instrument(skip(state, session, page, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    page: AdminPage,
    Path(id): Path<CategoryId>,
    multipart: Multipart,
) -> Result<Response> {
    let current: Category = records::require(&state, collections::CATEGORIES, id.as_str()).await?;
    let form = FormData::read(multipart).await?;
    let (category, discarded) = match build(&state, &form, Some(&current)).await {
        Ok(built) => built,
        Err(e) => {
            let values = CategoryValues::resubmitted(&form, Some(&current));
            let page = CategoryFormTemplate::new(&state, page, Some(&id), values);
            return Ok(invalid(page.with_error(e.form_message()?)));
        }
    };

    state.db().put(collections::CATEGORIES, id.as_str(), &category).await?;
    images::discard(&state, discarded).await;
    info!("Category updated");
    let flash = Flash::success(format!("Category \"{}\" saved", category.name));
    Ok(redirect_with(&session, flash, "/categories").await.into_response())
}

/// Delete a category no product points to.
#[instrument(skip(state, session, _admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path(id): Path<CategoryId>,
) -> Result<Response> {
    let category: Category = records::require(&state, collections::CATEGORIES, id.as_str()).await?;
    if records::is_referenced(&state, collections::PRODUCTS, "categoryId", id.as_str()).await? {
        let flash = Flash::error(format!(
            "\"{}\" still has products; move or delete them first",
            category.name
        ));
        return Ok(redirect_with(&session, flash, "/categories").await.into_response());
    }

    state.db().delete(collections::CATEGORIES, id.as_str()).await?;
    images::discard(&state, category.image.as_deref()).await;
    info!("Category deleted");
    let flash = Flash::success(format!("Category \"{}\" deleted", category.name));
    Ok(redirect_with(&session, flash, "/categories").await.into_response())
}

/// Swap a category's position with its neighbour.
#[instrument(skip(state, session, _admin))]
pub async fn move_category(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Path((id, direction)): Path<(CategoryId, String)>,
) -> Result<Response> {
    let direction = Direction::parse(&direction)
        .ok_or_else(|| AppError::NotFound(format!("direction {direction}")))?;
    let categories = all(&state).await?;

    if let Some(swap) = ordering::plan_move(&categories, &id, direction) {
        let writes = [swap.first, swap.second]
            .into_iter()
            .map(|(category_id, order)| {
                Ok(Write::update(
                    collections::CATEGORIES,
                    category_id.as_str(),
                    to_fields(&json!({ "order": order }))?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        state.db().commit(writes).await?;
        info!(?direction, "Category moved");
    }
    Ok(redirect_with(&session, Flash::success("Order updated"), "/categories")
        .await
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use camrent_firebase::MemoryDatastore;

    use super::*;
    use crate::config::tests::test_config;

    #[tokio::test]
    async fn test_build_preserves_order_and_id() {
        let state = AppState::new(test_config(), Arc::new(MemoryDatastore::new()), None, None, None);
        let current = Category {
            id: CategoryId::new("lenses"),
            name: "Lenses".to_string(),
            slug: "lenses".to_string(),
            image: Some("https://img/lenses.jpg".to_string()),
            order: 4,
        };
        let form = FormData::from_pairs([("name", "Cine Lenses"), ("slug", "")]);
        let (category, discarded) = build(&state, &form, Some(&current)).await.unwrap();
        assert_eq!(category.id, current.id);
        assert_eq!(category.order, 4);
        assert_eq!(category.slug, "cine-lenses");
        assert_eq!(category.image, current.image);
        assert!(discarded.is_none());
    }

    #[tokio::test]
    async fn test_build_requires_name() {
        let state = AppState::new(test_config(), Arc::new(MemoryDatastore::new()), None, None, None);
        let form = FormData::from_pairs([("name", " ")]);
        assert!(matches!(
            build(&state, &form, None).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
