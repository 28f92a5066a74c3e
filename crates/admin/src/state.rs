//! Application state shared across handlers.

use std::sync::Arc;

use camrent_firebase::{AlgoliaClient, AuthClient, Datastore, StorageClient};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    db: Arc<dyn Datastore>,
    auth: Option<AuthClient>,
    storage: Option<StorageClient>,
    search: Option<AlgoliaClient>,
}

impl AppState {
    /// Assemble the state from already-constructed clients.
    ///
    /// Without `auth` nobody can sign in; without `storage` image fields only
    /// accept URLs; without `search` product writes skip index sync.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        db: Arc<dyn Datastore>,
        auth: Option<AuthClient>,
        storage: Option<StorageClient>,
        search: Option<AlgoliaClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                auth,
                storage,
                search,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn db(&self) -> &Arc<dyn Datastore> {
        &self.inner.db
    }

    #[must_use]
    pub fn auth(&self) -> Option<&AuthClient> {
        self.inner.auth.as_ref()
    }

    #[must_use]
    pub fn storage(&self) -> Option<&StorageClient> {
        self.inner.storage.as_ref()
    }

    /// Algolia client, only when it holds a write key.
    #[must_use]
    pub fn search(&self) -> Option<&AlgoliaClient> {
        self.inner.search.as_ref().filter(|c| c.can_write())
    }
}
