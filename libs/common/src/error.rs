//! Custom error types for the common library
//!
//! This module defines the store-level error taxonomy used by every
//! component that talks to the document store.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for document store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while connecting to the store
    #[error("Store connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred while executing a store query
    #[error("Store query error: {0}")]
    Query(#[source] SqlxError),

    /// Configuration error
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
