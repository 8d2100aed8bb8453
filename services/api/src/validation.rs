//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate a collection name taken from the request path
pub fn validate_entity_name(entity: &str) -> Result<(), String> {
    if entity.is_empty() {
        return Err("Collection name is required".to_string());
    }

    if entity.len() > 64 {
        return Err("Collection name must be at most 64 characters long".to_string());
    }

    static ENTITY_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = ENTITY_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Failed to compile collection name regex")
    });

    if !regex.is_match(entity) {
        return Err(
            "Collection name can only contain letters, numbers, underscores, and dashes"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate that a login request carries both credential fields
pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }

    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    Ok(())
}
