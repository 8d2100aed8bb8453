//! API service routes
//!
//! The auth routes are fixed; every other path is a dynamic collection
//! route dispatched through the document accessor with no compile-time
//! knowledge of the collection's shape.

use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    jwt::Claims,
    middleware::auth_middleware,
    models::{DeleteResponse, LoginRequest, LoginResponse, ValidateResponse},
    state::AppState,
    store::DocumentStore,
    validation::{validate_entity_name, validate_login},
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/profile", get(profile))
        .route("/auth/validate", post(validate_token).get(validate_token))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .merge(protected_routes)
        .route("/:entity", get(list_documents).post(create_document))
        .route("/:entity/filter", get(filter_documents))
        .route("/:entity/id/:id", get(get_document))
        .route(
            "/:entity/:id",
            put(update_document).delete(delete_document),
        )
        .with_state(state)
}

/// Service info endpoint
pub async fn service_info() -> impl IntoResponse {
    Json(json!({
        "name": "Document Store API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "authentication": [
                "POST /auth/login",
                "POST /auth/logout",
                "GET /auth/profile",
                "POST /auth/validate"
            ],
            "collections": [
                "GET /{entity}",
                "GET /{entity}/filter",
                "GET /{entity}/id/{id}",
                "POST /{entity}",
                "PUT /{entity}/{id}",
                "DELETE /{entity}/{id}"
            ]
        }
    }))
}

/// Health check endpoint; pings the document store
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.store.ping().await?;

    Ok(Json(json!({
        "status": "ok",
        "service": "document-store-api"
    })))
}

/// Authenticate a user and return the token pair
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_login(&payload.email, &payload.password).map_err(ApiError::BadRequest)?;

    if !state.login_throttle.check(payload.email.trim()).await {
        return Err(ApiError::TooManyAttempts);
    }

    let outcome = state
        .auth_service
        .authenticate(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: outcome.user,
        tokens: outcome.tokens,
    }))
}

/// Acknowledge a logout.
///
/// Tokens are stateless and expire on their own; there is nothing to
/// invalidate server-side.
pub async fn logout(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    info!("User {} logged out", claims.sub);

    Json(json!({"message": "Logout successful"}))
}

/// Return the caller's user document, without the credential field
pub async fn profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<impl IntoResponse> {
    let user = state.auth_service.resolve_current_user(claims.sub).await?;

    Ok(Json(json!({"user": user})))
}

/// Report the verified token's subject and expiry
pub async fn validate_token(Extension(claims): Extension<Claims>) -> ApiResult<impl IntoResponse> {
    let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
        .ok_or_else(|| ApiError::Internal("Token expiry out of range".to_string()))?;

    Ok(Json(ValidateResponse {
        valid: true,
        user_id: claims.sub.to_string(),
        expires_at: expires_at.to_rfc3339(),
        token_type: claims.token_type,
    }))
}

/// List every document in a collection
pub async fn list_documents(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let docs = state.accessor.list(&entity).await?;

    Ok(Json(docs))
}

/// Create a new document in a collection
pub async fn create_document(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let doc = state.accessor.create(&entity, payload).await?;

    Ok((StatusCode::CREATED, Json(doc)))
}

/// Get a single document by identifier
pub async fn get_document(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let doc = state.accessor.get_by_id(&entity, &id).await?;

    Ok(Json(doc))
}

/// Get documents matching the coerced query parameters
pub async fn filter_documents(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let docs = state.accessor.filter(&entity, &params).await?;

    Ok(Json(docs))
}

/// Merge fields into an existing document
pub async fn update_document(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let doc = state.accessor.update(&entity, &id, payload).await?;

    Ok(Json(doc))
}

/// Delete a document, returning its content
pub async fn delete_document(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    validate_entity_name(&entity).map_err(ApiError::BadRequest)?;

    let doc = state.accessor.delete(&entity, &id).await?;

    Ok(Json(DeleteResponse {
        message: "Document deleted successfully".to_string(),
        deleted_document: doc,
    }))
}
