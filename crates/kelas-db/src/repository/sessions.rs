//! Login session operations

use chrono::{DateTime, Utc};

use crate::error::DbError;
use crate::models::{NewSession, Session};
use crate::utils::format_timestamp;

use super::Database;

impl Database {
    /// Create a new login session
    pub async fn insert_session(&self, session: NewSession) -> Result<Session, DbError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.user_id)
        .bind(format_timestamp(&session.created_at))
        .bind(format_timestamp(&session.expires_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DbError::Duplicate("session token".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Session {
            token_hash: session.token_hash,
            user_id: session.user_id,
            created_at: session.created_at,
            expires_at: session.expires_at,
        })
    }

    /// Get a session by token digest
    pub async fn get_session(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT token_hash, user_id, created_at, expires_at
            FROM sessions
            WHERE token_hash = ?
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Session::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a session
    pub async fn delete_session(&self, token_hash: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session belonging to a user
    pub async fn delete_sessions_for_user(&self, user_id: i64) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry is at or before `now`
    pub async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(format_timestamp(&now))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count sessions for a user (live or not)
    pub async fn count_sessions_for_user(&self, user_id: i64) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
