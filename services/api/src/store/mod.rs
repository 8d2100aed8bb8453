//! Document store abstraction
//!
//! The store exposes collection-level primitives only: find, find by
//! identifier, insert, merge-update, and delete. Components above it never
//! issue raw queries against storage internals, and the trait seam lets
//! tests substitute the in-memory implementation for the PostgreSQL one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::StoreResult;
use serde_json::{Map, Value};
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// One stored document: the store-assigned identifier, the open body, and
/// the store-managed timestamps.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub body: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A field-equality filter over a collection.
///
/// The reserved identifier value is held apart from the body fields and
/// compared as text. Parsing it into the native identifier type would
/// reject a valid-looking-but-wrong-format string with a hard failure;
/// comparing as text makes such a value match nothing instead.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Raw identifier value, matched against the canonical string form
    pub id: Option<String>,
    /// Body fields, each matched for equality
    pub fields: Map<String, Value>,
}

impl Filter {
    /// Filter matching every document in a collection
    pub fn all() -> Self {
        Self::default()
    }
}

/// Collection-level primitives of the document store.
///
/// Implementations provide their own concurrency control for
/// single-document reads and writes; callers never lock. Collections come
/// into existence lazily on first insert, and an unknown collection reads
/// as empty.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Return all documents of `collection` matching `filter`
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>>;

    /// Look up one document by identifier
    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<StoredDocument>>;

    /// Insert a document, assigning its identifier and timestamps
    async fn insert_one(
        &self,
        collection: &str,
        body: Map<String, Value>,
    ) -> StoreResult<StoredDocument>;

    /// Merge `patch` into the document body field by field and refresh
    /// `updated_at`. Returns `None` when no document has the identifier.
    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> StoreResult<Option<StoredDocument>>;

    /// Remove a document. Returns true when a document was removed.
    async fn delete_one(&self, collection: &str, id: Uuid) -> StoreResult<bool>;
}
