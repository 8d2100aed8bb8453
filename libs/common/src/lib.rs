//! Common library for the document store service
//!
//! This crate provides the infrastructure shared by the API service:
//! PostgreSQL connectivity and pooling, bootstrap of the backing
//! `documents` table, and the store-level error types.

pub mod database;
pub mod error;
