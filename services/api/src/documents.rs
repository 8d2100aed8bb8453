//! Generic document access
//!
//! Translates entity-agnostic requests into document store operations
//! with no compile-time knowledge of any collection's shape: identifier
//! parsing, query-string value coercion, reserved-field handling, and
//! wire serialization all live here.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::store::{DocumentStore, Filter, StoredDocument};

/// Reserved wire key carrying the canonical string form of the identifier
pub const ID_FIELD: &str = "id";
/// Store-managed creation instant
pub const CREATED_AT_FIELD: &str = "created_at";
/// Store-managed last-update instant
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Parse a raw identifier from the request path.
///
/// A string that is not in the canonical identifier format is a malformed
/// request, which is a different failure from an identifier that simply
/// matches no document.
fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid identifier format".to_string()))
}

/// Coerce a raw query value into its richest type.
///
/// Ordered chain of parse attempts: the literals `true`/`false`
/// (case-insensitive) become booleans, all-digit strings become integers,
/// decimal strings become floats, and everything else stays a string.
pub fn coerce_query_value(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }

    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<i64>() {
            return Value::from(n);
        }
    }

    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }

    Value::String(raw.to_string())
}

/// Build a store filter from raw query parameters.
///
/// The reserved identifier key is the one exception to the coercion
/// chain: its value stays a string and is matched against the canonical
/// identifier form, so a malformed value matches nothing instead of
/// failing the request.
pub fn build_filter(params: &HashMap<String, String>) -> Filter {
    let mut filter = Filter::all();

    for (key, raw) in params {
        if key == ID_FIELD {
            filter.id = Some(raw.clone());
        } else {
            filter
                .fields
                .insert(key.clone(), coerce_query_value(raw));
        }
    }

    filter
}

/// Serialize a stored document into its wire form: the open body plus the
/// identifier as its canonical string and the timestamps as RFC 3339.
pub fn to_wire(doc: StoredDocument) -> Value {
    let mut body = doc.body;
    body.insert(ID_FIELD.to_string(), Value::String(doc.id.to_string()));
    body.insert(
        CREATED_AT_FIELD.to_string(),
        Value::String(doc.created_at.to_rfc3339()),
    );
    body.insert(
        UPDATED_AT_FIELD.to_string(),
        Value::String(doc.updated_at.to_rfc3339()),
    );

    Value::Object(body)
}

/// The store owns the identifier and the timestamps; client-supplied
/// values for them are discarded on every write path.
fn strip_reserved(body: &mut Map<String, Value>) {
    body.remove(ID_FIELD);
    body.remove(CREATED_AT_FIELD);
    body.remove(UPDATED_AT_FIELD);
}

fn as_object(payload: Value) -> ApiResult<Map<String, Value>> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "Document body must be a JSON object".to_string(),
        )),
    }
}

/// Entity-agnostic CRUD over named collections
#[derive(Clone)]
pub struct DocumentAccessor {
    store: Arc<dyn DocumentStore>,
}

impl DocumentAccessor {
    /// Create a new accessor over an injected store handle
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Return every document in the collection. An unknown or empty
    /// collection yields an empty result set, never an error.
    pub async fn list(&self, collection: &str) -> ApiResult<Vec<Value>> {
        let docs = self.store.find(collection, &Filter::all()).await?;

        Ok(docs.into_iter().map(to_wire).collect())
    }

    /// Look up one document by its identifier
    pub async fn get_by_id(&self, collection: &str, raw_id: &str) -> ApiResult<Value> {
        let id = parse_id(raw_id)?;

        let doc = self
            .store
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

        Ok(to_wire(doc))
    }

    /// Insert an arbitrary document payload and return the stored form,
    /// including the newly assigned identifier and timestamps.
    pub async fn create(&self, collection: &str, payload: Value) -> ApiResult<Value> {
        let mut body = as_object(payload)?;
        strip_reserved(&mut body);

        let doc = self.store.insert_one(collection, body).await?;

        Ok(to_wire(doc))
    }

    /// Merge the given fields into an existing document and return the
    /// post-update form. Only the supplied keys change.
    pub async fn update(&self, collection: &str, raw_id: &str, payload: Value) -> ApiResult<Value> {
        let id = parse_id(raw_id)?;

        let mut patch = as_object(payload)?;
        strip_reserved(&mut patch);

        let doc = self
            .store
            .update_one(collection, id, patch)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

        Ok(to_wire(doc))
    }

    /// Remove a document, returning its content so callers can audit or
    /// undo the removal. The document is fetched before deletion.
    pub async fn delete(&self, collection: &str, raw_id: &str) -> ApiResult<Value> {
        let id = parse_id(raw_id)?;

        let doc = self
            .store
            .find_by_id(collection, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

        if !self.store.delete_one(collection, id).await? {
            return Err(ApiError::NotFound("Document not found".to_string()));
        }

        Ok(to_wire(doc))
    }

    /// Return all documents matching the coerced query parameters. An
    /// empty parameter set matches everything.
    pub async fn filter(
        &self,
        collection: &str,
        params: &HashMap<String, String>,
    ) -> ApiResult<Vec<Value>> {
        let filter = build_filter(params);

        let docs = self.store.find(collection, &filter).await?;

        Ok(docs.into_iter().map(to_wire).collect())
    }

    /// Find the first document whose field equals the given value
    pub(crate) async fn find_one_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> ApiResult<Option<StoredDocument>> {
        let mut filter = Filter::all();
        filter.fields.insert(field.to_string(), value);

        let mut docs = self.store.find(collection, &filter).await?;

        if docs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(docs.remove(0)))
        }
    }

    /// Look up a stored document by its parsed identifier
    pub(crate) async fn find_stored(
        &self,
        collection: &str,
        id: Uuid,
    ) -> ApiResult<Option<StoredDocument>> {
        Ok(self.store.find_by_id(collection, id).await?)
    }

    /// Merge fields into a document without going through the wire form
    pub(crate) async fn merge_fields(
        &self,
        collection: &str,
        id: Uuid,
        patch: Map<String, Value>,
    ) -> ApiResult<Option<StoredDocument>> {
        Ok(self.store.update_one(collection, id, patch).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn accessor() -> DocumentAccessor {
        DocumentAccessor::new(Arc::new(MemoryStore::new()))
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_coerce_boolean_literals() {
        assert_eq!(coerce_query_value("true"), Value::Bool(true));
        assert_eq!(coerce_query_value("TRUE"), Value::Bool(true));
        assert_eq!(coerce_query_value("false"), Value::Bool(false));
        assert_eq!(coerce_query_value("False"), Value::Bool(false));
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_query_value("30"), json!(30));
        assert_eq!(coerce_query_value("0"), json!(0));
        assert_eq!(coerce_query_value("3.5"), json!(3.5));
        assert_eq!(coerce_query_value("-2"), json!(-2.0));
    }

    #[test]
    fn test_coerce_string_fallback() {
        assert_eq!(coerce_query_value("Ann"), json!("Ann"));
        assert_eq!(coerce_query_value("12abc"), json!("12abc"));
        assert_eq!(coerce_query_value(""), json!(""));
    }

    #[test]
    fn test_build_filter_keeps_identifier_as_string() {
        let filter = build_filter(&params(&[("id", "42"), ("age", "42")]));

        assert_eq!(filter.id.as_deref(), Some("42"));
        assert_eq!(filter.fields.get("age"), Some(&json!(42)));
        assert!(!filter.fields.contains_key("id"));
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let accessor = accessor();

        let created = accessor
            .create("books", json!({"title": "Dune", "pages": 412}))
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap().to_string();
        let fetched = accessor.get_by_id("books", &id).await.unwrap();

        assert_eq!(fetched["title"], json!("Dune"));
        assert_eq!(fetched["pages"], json!(412));
        assert_eq!(fetched["id"], created["id"]);
        assert!(fetched["created_at"].is_string());
        assert!(fetched["updated_at"].is_string());
    }

    #[tokio::test]
    async fn test_create_ignores_reserved_fields() {
        let accessor = accessor();

        let created = accessor
            .create(
                "books",
                json!({"title": "Dune", "id": "not-yours", "created_at": "1999-01-01"}),
            )
            .await
            .unwrap();

        assert_ne!(created["id"], json!("not-yours"));
        assert_ne!(created["created_at"], json!("1999-01-01"));
        assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_create_rejects_non_object_payload() {
        let accessor = accessor();

        let err = accessor.create("books", json!([1, 2, 3])).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_get_with_malformed_identifier() {
        let accessor = accessor();

        let err = accessor.get_by_id("books", "not-a-uuid").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_identifier_is_not_found() {
        let accessor = accessor();

        let err = accessor
            .get_by_id("books", &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let accessor = accessor();

        let created = accessor
            .create("books", json!({"title": "Dune", "pages": 412}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let updated = accessor
            .update("books", &id, json!({"pages": 500}))
            .await
            .unwrap();

        assert_eq!(updated["title"], json!("Dune"));
        assert_eq!(updated["pages"], json!(500));

        let created_at = updated["created_at"].as_str().unwrap();
        let updated_at = updated["updated_at"].as_str().unwrap();
        assert!(updated_at >= created_at);
    }

    #[tokio::test]
    async fn test_update_failures() {
        let accessor = accessor();

        let err = accessor
            .update("books", "nope", json!({"pages": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err = accessor
            .update("books", &Uuid::new_v4().to_string(), json!({"pages": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_content_then_not_found() {
        let accessor = accessor();

        let created = accessor
            .create("books", json!({"title": "Dune"}))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap().to_string();

        let deleted = accessor.delete("books", &id).await.unwrap();
        assert_eq!(deleted["title"], json!("Dune"));

        let err = accessor.get_by_id("books", &id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = accessor.delete("books", &id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_unknown_collection_is_empty() {
        let accessor = accessor();

        let docs = accessor.list("nothing-here").await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_filter_coercion_matches_typed_fields() {
        let accessor = accessor();

        accessor
            .create(
                "people",
                json!({"name": "Ann", "age": 30, "score": 3.5, "active": true}),
            )
            .await
            .unwrap();
        accessor
            .create(
                "people",
                json!({"name": "Bob", "age": 41, "score": 1.0, "active": false}),
            )
            .await
            .unwrap();

        let hits = accessor
            .filter("people", &params(&[("active", "true")]))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], json!("Ann"));

        let hits = accessor
            .filter("people", &params(&[("age", "30")]))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let hits = accessor
            .filter("people", &params(&[("score", "3.5")]))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let hits = accessor
            .filter("people", &params(&[("name", "Ann")]))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_is_idempotent() {
        let accessor = accessor();

        accessor
            .create("people", json!({"name": "Ann", "active": true}))
            .await
            .unwrap();

        let query = params(&[("active", "true")]);
        let first = accessor.filter("people", &query).await.unwrap();
        let second = accessor.filter("people", &query).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_filter_empty_params_matches_everything() {
        let accessor = accessor();

        accessor.create("people", json!({"name": "Ann"})).await.unwrap();
        accessor.create("people", json!({"name": "Bob"})).await.unwrap();

        let hits = accessor.filter("people", &HashMap::new()).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_filter_malformed_identifier_matches_nothing() {
        let accessor = accessor();

        accessor.create("people", json!({"name": "Ann"})).await.unwrap();

        // Not a valid identifier format, but filtering must not fail.
        let hits = accessor
            .filter("people", &params(&[("id", "definitely-not-an-id")]))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_identifier_string() {
        let accessor = accessor();

        let created = accessor.create("people", json!({"name": "Ann"})).await.unwrap();
        accessor.create("people", json!({"name": "Bob"})).await.unwrap();

        let id = created["id"].as_str().unwrap();
        let hits = accessor
            .filter("people", &params(&[("id", id)]))
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["name"], json!("Ann"));
    }
}
