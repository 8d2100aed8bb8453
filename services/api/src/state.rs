//! Application state shared across handlers

use std::sync::Arc;

use crate::auth::AuthService;
use crate::documents::DocumentAccessor;
use crate::jwt::JwtService;
use crate::store::DocumentStore;
use crate::throttle::LoginThrottle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub accessor: DocumentAccessor,
    pub auth_service: AuthService,
    pub jwt_service: JwtService,
    pub login_throttle: LoginThrottle,
}
