//! User operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;
use crate::utils::format_timestamp;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// The UNIQUE constraint decides duplicates, so concurrent inserts of one
    /// username yield exactly one `Duplicate`.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, full_name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(format_timestamp(&now))
        .bind(format_timestamp(&now))
        .fetch_one(&self.pool)
        .await;

        let id: i64 = match result {
            Ok(row) => row.get("id"),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DbError::Duplicate(format!(
                    "User '{}' already exists",
                    user.username
                )));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            full_name: user.full_name,
            role: user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by username (case-sensitive exact match)
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, password_hash, full_name, role, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, username, password_hash, full_name, role, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// List all users
    pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password_hash, full_name, role, created_at, updated_at
            FROM users
            ORDER BY username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| User::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Delete a user
    ///
    /// Sessions are not touched here; see `delete_sessions_for_user`.
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if any users exist
    pub async fn has_users(&self) -> Result<bool, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = result.get("count");
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$dummy".to_string(),
            full_name: format!("{} full name", username),
            role,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let db = Database::in_memory().await.unwrap();
        let inserted = db.insert_user(new_user("guru1", Role::Guru)).await.unwrap();

        let by_name = db.get_user_by_username("guru1").await.unwrap().unwrap();
        assert_eq!(by_name.id, inserted.id);
        assert_eq!(by_name.role, Role::Guru);
        assert_eq!(by_name.full_name, "guru1 full name");

        let by_id = db.get_user_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "guru1");
    }

    #[tokio::test]
    async fn test_username_lookup_is_case_sensitive() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("admin1", Role::Admin)).await.unwrap();

        assert!(db.get_user_by_username("ADMIN1").await.unwrap().is_none());
        assert!(db.get_user_by_username("admin1 ").await.unwrap().is_none());
        assert!(db.get_user_by_username("admin1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = Database::in_memory().await.unwrap();
        db.insert_user(new_user("siswa1", Role::Siswa)).await.unwrap();

        let err = db.insert_user(new_user("siswa1", Role::Guru)).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_one_username() {
        let db = Database::in_memory().await.unwrap();

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.insert_user(new_user("guru2", Role::Guru)).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DbError::Duplicate(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(duplicates, 5);
    }

    #[tokio::test]
    async fn test_list_and_delete_users() {
        let db = Database::in_memory().await.unwrap();
        assert!(!db.has_users().await.unwrap());

        let b = db.insert_user(new_user("b", Role::Siswa)).await.unwrap();
        db.insert_user(new_user("a", Role::Admin)).await.unwrap();

        let names: Vec<_> = db
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["a", "b"]);

        assert!(db.delete_user(b.id).await.unwrap());
        assert!(!db.delete_user(b.id).await.unwrap());
        assert!(db.get_user_by_id(b.id).await.unwrap().is_none());
    }
}
