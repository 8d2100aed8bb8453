//! Session authentication
//!
//! Credential verification, token minting, and resolution of the
//! authenticated identity. User records live in the reserved `users`
//! collection and are read and updated through the document accessor,
//! never through storage internals.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::documents::{DocumentAccessor, to_wire};
use crate::error::{ApiError, ApiResult};
use crate::jwt::JwtService;
use crate::models::{TokenPair, UserProfile};
use crate::store::StoredDocument;

/// Reserved collection holding user records
pub const USERS_COLLECTION: &str = "users";

/// Body field holding the credential material
const PASSWORD_FIELD: &str = "password";

/// Hash a password into its PHC string form
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a stored PHC hash string.
///
/// A stored value that does not parse as a hash verifies as false; the
/// caller treats that as a credential mismatch, not a server failure.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Outcome of a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Session authenticator
#[derive(Clone)]
pub struct AuthService {
    accessor: DocumentAccessor,
    jwt: JwtService,
}

impl AuthService {
    /// Create a new authenticator over the injected accessor and JWT service
    pub fn new(accessor: DocumentAccessor, jwt: JwtService) -> Self {
        Self { accessor, jwt }
    }

    async fn find_user(&self, identifier: &str) -> ApiResult<Option<StoredDocument>> {
        let by_email = self
            .accessor
            .find_one_by_field(
                USERS_COLLECTION,
                "email",
                Value::String(identifier.to_string()),
            )
            .await?;

        if by_email.is_some() {
            return Ok(by_email);
        }

        self.accessor
            .find_one_by_field(
                USERS_COLLECTION,
                "username",
                Value::String(identifier.to_string()),
            )
            .await
    }

    /// Verify a credential pair and mint a token pair.
    ///
    /// Unknown accounts and wrong passwords are the same failure; a
    /// disabled account is kept distinct internally but renders to
    /// callers identically.
    pub async fn authenticate(&self, identifier: &str, password: &str) -> ApiResult<LoginOutcome> {
        let user = self
            .find_user(identifier)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        let stored_hash = user
            .body
            .get(PASSWORD_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !verify_password(password, stored_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        if !user
            .body
            .get("is_active")
            .and_then(Value::as_bool)
            .unwrap_or(true)
        {
            return Err(ApiError::AccountDisabled);
        }

        // Record the login instant on the user document
        let mut patch = Map::new();
        patch.insert(
            "last_login".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        self.accessor
            .merge_fields(USERS_COLLECTION, user.id, patch)
            .await?;

        let access_token = self.jwt.generate_access_token(user.id)?;
        let refresh_token = self.jwt.generate_refresh_token(user.id)?;

        info!("User {} logged in", user.id);

        Ok(LoginOutcome {
            user: UserProfile::from_document(&user),
            tokens: TokenPair {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: self.jwt.access_token_expiry(),
            },
        })
    }

    /// Resolve the live user record behind a verified subject.
    ///
    /// A valid signature does not guarantee a live account: the subject
    /// may have been deleted after issuance, which reads as an invalid
    /// token rather than a store failure. The credential field is
    /// removed from the returned document.
    pub async fn resolve_current_user(&self, user_id: Uuid) -> ApiResult<Value> {
        let user = self
            .accessor
            .find_stored(USERS_COLLECTION, user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        let mut wire = to_wire(user);
        if let Value::Object(map) = &mut wire {
            map.remove(PASSWORD_FIELD);
        }

        Ok(wire)
    }
}
