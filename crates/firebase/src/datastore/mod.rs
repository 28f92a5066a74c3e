//! Document storage.
//!
//! [`Datastore`] is the seam between the applications and Firestore.
//! [`HttpDatastore`] talks to the Firestore REST API; [`MemoryDatastore`]
//! keeps documents in process for tests and local development. Both follow
//! the same semantics:
//!
//! - `set` creates or replaces a whole document
//! - `update` merges the given top-level fields and fails with
//!   [`FirebaseError::NotFound`] if the document does not exist
//! - `delete` is idempotent
//! - `commit` applies all writes atomically or none of them

mod http;
mod memory;

pub use http::{HttpDatastore, RetrySettings};
pub use memory::MemoryDatastore;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::document::{Document, Fields, to_fields};
use crate::error::{FirebaseError, Result};
use crate::query::Query;

/// One write in an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

impl Write {
    #[must_use]
    pub fn update(collection: &str, id: &str, fields: Fields) -> Self {
        Self::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn set(collection: &str, id: &str, fields: Fields) -> Self {
        Self::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn delete(collection: &str, id: &str) -> Self {
        Self::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// Firestore-style document store.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Read one document, `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Run a query.
    async fn list(&self, query: &Query) -> Result<Vec<Document>>;

    /// Apply writes atomically.
    async fn commit(&self, writes: Vec<Write>) -> Result<()>;

    /// Create a document with a generated ID and return the ID.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let id = auto_id();
        self.commit(vec![Write::set(collection, &id, fields)])
            .await?;
        Ok(id)
    }

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.commit(vec![Write::set(collection, id, fields)]).await
    }

    /// Merge top-level fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.commit(vec![Write::update(collection, id, fields)])
            .await
    }

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.commit(vec![Write::delete(collection, id)]).await
    }
}

impl dyn Datastore + '_ {
    /// Read and decode one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the document does not decode.
    pub async fn fetch<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        match self.get(collection, id).await? {
            Some(document) => document.decode().map(Some),
            None => Ok(None),
        }
    }

    /// Run a query and decode every result.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or any document does not decode.
    pub async fn fetch_all<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        self.list(query)
            .await?
            .iter()
            .map(Document::decode)
            .collect()
    }

    /// Run a query and decode the results, skipping documents that do not
    /// decode.
    ///
    /// Each skipped document is logged with its collection and ID. Used where
    /// rendering the readable part of a collection beats failing the page.
    ///
    /// # Errors
    ///
    /// Returns an error only if the query itself fails.
    pub async fn fetch_readable<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        Ok(self
            .list(query)
            .await?
            .iter()
            .filter_map(|document| match document.decode() {
                Ok(item) => Some(item),
                Err(error) => {
                    tracing::warn!(
                        collection = %document.collection,
                        id = %document.id,
                        error = %error,
                        "Skipping undecodable document"
                    );
                    None
                }
            })
            .collect())
    }

    /// Serialize a model and create it with a generated ID.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn insert<T: Serialize + Sync>(&self, collection: &str, value: &T) -> Result<String> {
        self.create(collection, to_fields(value)?).await
    }

    /// Serialize a model and create or replace the document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn put<T: Serialize + Sync>(&self, collection: &str, id: &str, value: &T) -> Result<()> {
        self.set(collection, id, to_fields(value)?).await
    }

    /// Whether a document exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }
}

/// 20-character alphanumeric ID, the same shape Firestore clients generate.
#[must_use]
pub fn auto_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(20)
        .collect()
}

pub(crate) fn not_found(collection: &str, id: &str) -> FirebaseError {
    FirebaseError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_id_shape() {
        let id = auto_id();
        assert_eq!(id.len(), 20);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, auto_id());
    }
}
