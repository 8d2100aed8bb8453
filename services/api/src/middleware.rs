//! Authentication middleware for JWT token validation

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::jwt::TokenType;
use crate::state::AppState;

/// Extract and validate the bearer token on protected routes.
///
/// Verification is pure computation on the token itself; handlers that
/// need the live user record do their own lookup using the claims placed
/// in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::InvalidToken)?;

    // Check if it's a Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::InvalidToken)?;

    let claims = state.jwt_service.validate_token(token)?;

    // Refresh tokens cannot be presented on protected routes
    if claims.token_type != TokenType::Access {
        return Err(ApiError::InvalidToken);
    }

    // Make the claims available to handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
