//! API models for request and response payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jwt::TokenType;
use crate::store::StoredDocument;

/// Request for user login.
///
/// Missing fields deserialize as empty and are rejected by validation,
/// so an incomplete body reads as malformed input rather than a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address (or username) identifying the account
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token pair returned on login
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: u64,
}

/// Caller-safe user projection; the credential field never appears here
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl UserProfile {
    /// Project a stored user document into its caller-safe form
    pub fn from_document(doc: &StoredDocument) -> Self {
        let field = |key: &str| {
            doc.body
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let email = match doc.body.get("email").and_then(Value::as_str) {
            Some(email) => email.to_string(),
            None => field("username"),
        };

        let role = match doc.body.get("role").and_then(Value::as_str) {
            Some(role) => role.to_string(),
            None => "user".to_string(),
        };

        UserProfile {
            id: doc.id.to_string(),
            email,
            name: field("name"),
            role,
        }
    }
}

/// Response for user login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Response for token validation
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub user_id: String,
    /// RFC 3339 instant at which the token stops verifying
    pub expires_at: String,
    pub token_type: TokenType,
}

/// Response for document deletion, carrying the removed content
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_document: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::{Map, json};
    use uuid::Uuid;

    fn user_doc(body: Value) -> StoredDocument {
        let body = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let now = Utc::now();
        StoredDocument {
            id: Uuid::new_v4(),
            body,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_profile_defaults() {
        let doc = user_doc(json!({"email": "a@x.com", "password": "hash"}));
        let profile = UserProfile::from_document(&doc);

        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.name, "");
        assert_eq!(profile.role, "user");
        assert_eq!(profile.id, doc.id.to_string());
    }

    #[test]
    fn test_profile_username_fallback() {
        let doc = user_doc(json!({"username": "ann", "role": "admin", "name": "Ann"}));
        let profile = UserProfile::from_document(&doc);

        assert_eq!(profile.email, "ann");
        assert_eq!(profile.role, "admin");
        assert_eq!(profile.name, "Ann");
    }

    #[test]
    fn test_profile_never_serializes_password() {
        let doc = user_doc(json!({"email": "a@x.com", "password": "hash"}));
        let profile = UserProfile::from_document(&doc);

        let serialized = serde_json::to_value(&profile).unwrap();
        assert!(serialized.get("password").is_none());
    }
}
