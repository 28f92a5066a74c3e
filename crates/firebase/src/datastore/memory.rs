//! In-process datastore for tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Datastore, Write, not_found};
use crate::document::{Document, Fields};
use crate::error::Result;
use crate::query::Query;

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// Documents held in memory, with the same write semantics as Firestore.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatastore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryDatastore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn apply(collections: &mut Collections, write: Write) -> Result<()> {
    match write {
        Write::Set {
            collection,
            id,
            fields,
        } => {
            collections.entry(collection).or_default().insert(id, fields);
        }
        Write::Update {
            collection,
            id,
            fields,
        } => {
            let existing = collections
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(&id))
                .ok_or_else(|| not_found(&collection, &id))?;
            existing.extend(fields);
        }
        Write::Delete { collection, id } => {
            if let Some(docs) = collections.get_mut(&collection) {
                docs.remove(&id);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Datastore for MemoryDatastore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(collection, id, fields.clone())))
    }

    async fn list(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(&String, &Fields)> = docs
            .iter()
            .filter(|(_, fields)| query.matches(fields))
            .collect();
        // BTreeMap iteration is by ID, which keeps ties stable.
        matched.sort_by(|(_, a), (_, b)| query.compare(a, b));

        Ok(matched
            .into_iter()
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|(id, fields)| Document::new(query.collection.as_str(), id.as_str(), fields.clone()))
            .collect())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<()> {
        let mut collections = self.collections.write().await;
        let mut staged = collections.clone();
        for write in writes {
            apply(&mut staged, write)?;
        }
        *collections = staged;
        Ok(())
    }
}
