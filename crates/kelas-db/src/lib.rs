//! Kelas Database Layer
//!
//! This crate provides the credential and session stores for Kelas,
//! using SQLite via sqlx for persistence.

pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use store::{CredentialStore, SessionStore};

/// Re-export sqlx types for convenience
pub use sqlx::{Error as SqlxError, SqlitePool};
