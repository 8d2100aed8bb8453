//! In-memory document store
//!
//! Mirrors the observable semantics of the PostgreSQL store. The test
//! suite runs against this implementation through the `DocumentStore`
//! seam; nothing above the trait can tell the two apart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::error::StoreResult;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DocumentStore, Filter, StoredDocument};

/// Document store held entirely in process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, Vec<StoredDocument>>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &StoredDocument, filter: &Filter) -> bool {
    if let Some(raw) = &filter.id {
        if doc.id.to_string() != *raw {
            return false;
        }
    }

    filter
        .fields
        .iter()
        .all(|(key, expected)| doc.body.get(key) == Some(expected))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.lock().await;

        let docs = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(docs)
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<StoredDocument>> {
        let collections = self.collections.lock().await;

        let doc = collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned();

        Ok(doc)
    }

    async fn insert_one(
        &self,
        collection: &str,
        body: Map<String, Value>,
    ) -> StoreResult<StoredDocument> {
        let now = Utc::now();
        let doc = StoredDocument {
            id: Uuid::new_v4(),
            body,
            created_at: now,
            updated_at: now,
        };

        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());

        Ok(doc)
    }

    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> StoreResult<Option<StoredDocument>> {
        let mut collections = self.collections.lock().await;

        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id));

        match doc {
            Some(doc) => {
                for (key, value) in patch {
                    doc.body.insert(key, value);
                }
                doc.updated_at = Utc::now();
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_one(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.collections.lock().await;

        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|doc| doc.id != id);

        Ok(docs.len() < before)
    }
}
