//! Application state shared across handlers.

use std::sync::Arc;

use camrent_firebase::{AlgoliaClient, AuthClient, Datastore};

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::content::ContentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    db: Arc<dyn Datastore>,
    catalog: CatalogClient,
    auth: Option<AuthClient>,
    search: Option<AlgoliaClient>,
    content: ContentStore,
}

impl AppState {
    /// Assemble the state from already-constructed clients.
    ///
    /// Sign-in is disabled when `auth` is `None`; search uses the in-memory
    /// catalog when `search` is `None`.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        db: Arc<dyn Datastore>,
        auth: Option<AuthClient>,
        search: Option<AlgoliaClient>,
        content: ContentStore,
    ) -> Self {
        let catalog = CatalogClient::new(db.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                catalog,
                auth,
                search,
                content,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Direct datastore access, for writes and per-user documents.
    #[must_use]
    pub fn db(&self) -> &Arc<dyn Datastore> {
        &self.inner.db
    }

    /// Cached catalog and settings reads.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    #[must_use]
    pub fn auth(&self) -> Option<&AuthClient> {
        self.inner.auth.as_ref()
    }

    #[must_use]
    pub fn search(&self) -> Option<&AlgoliaClient> {
        self.inner.search.as_ref()
    }

    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
