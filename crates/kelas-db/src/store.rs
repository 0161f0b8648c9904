//! Store traits consumed by the authentication layer
//!
//! The session manager only ever sees these two seams. `Database`
//! implements both; tests substitute their own implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::{NewSession, Session, User};
use crate::repository::Database;

/// Read-only view of user records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by exact, case-sensitive username
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Look up a user by ID
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError>;
}

/// Durable token table
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session row
    async fn insert_session(&self, session: NewSession) -> Result<Session, DbError>;

    /// Fetch a session row by token digest
    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, DbError>;

    /// Remove a session row; returns whether a row existed
    async fn remove_session(&self, token_hash: &str) -> Result<bool, DbError>;

    /// Remove every session row of a user
    async fn remove_sessions_for_user(&self, user_id: i64) -> Result<u64, DbError>;

    /// Remove every session row expiring at or before `now`
    async fn remove_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DbError>;
}

#[async_trait]
impl CredentialStore for Database {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        self.get_user_by_username(username).await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        self.get_user_by_id(id).await
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn insert_session(&self, session: NewSession) -> Result<Session, DbError> {
        Database::insert_session(self, session).await
    }

    async fn find_session(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
        self.get_session(token_hash).await
    }

    async fn remove_session(&self, token_hash: &str) -> Result<bool, DbError> {
        self.delete_session(token_hash).await
    }

    async fn remove_sessions_for_user(&self, user_id: i64) -> Result<u64, DbError> {
        self.delete_sessions_for_user(user_id).await
    }

    async fn remove_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        self.delete_expired_sessions(now).await
    }
}
