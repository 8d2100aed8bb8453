//! PostgreSQL-backed document store
//!
//! Every collection lives in the single `documents` table as the rows
//! sharing a `collection` value. Field-equality filters use JSONB
//! containment; identifier filters compare against the text form of the
//! id column so a malformed value matches nothing.

use async_trait::async_trait;
use common::error::{StoreError, StoreResult};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{DocumentStore, Filter, StoredDocument};

/// Document store over the `documents` table
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over an initialized pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_document(row: PgRow) -> StoredDocument {
    let body: Value = row.get("body");
    let body = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    StoredDocument {
        id: row.get("id"),
        body,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<StoredDocument>> {
        let fields = Value::Object(filter.fields.clone());

        let rows = sqlx::query(
            r#"
            SELECT id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1
              AND body @> $2
              AND ($3::text IS NULL OR id::text = $3)
            ORDER BY created_at
            "#,
        )
        .bind(collection)
        .bind(fields)
        .bind(filter.id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(rows.into_iter().map(row_to_document).collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> StoreResult<Option<StoredDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(row.map(row_to_document))
    }

    async fn insert_one(
        &self,
        collection: &str,
        body: Map<String, Value>,
    ) -> StoreResult<StoredDocument> {
        let row = sqlx::query(
            r#"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2)
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(Value::Object(body))
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(row_to_document(row))
    }

    async fn update_one(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> StoreResult<Option<StoredDocument>> {
        let row = sqlx::query(
            r#"
            UPDATE documents
            SET body = body || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Value::Object(patch))
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Query)?;

        Ok(row.map(row_to_document))
    }

    async fn delete_one(&self, collection: &str, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
