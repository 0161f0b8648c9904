//! User management routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use kelas_auth::hash_password;
use kelas_db::{NewUser, Role};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::extract::{RequireAdmin, RequireStaff};
use crate::state::AppState;

use super::types::{CreateUserRequest, UserResponse};

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length
const MAX_PASSWORD_LENGTH: usize = 256;
/// Minimum allowed password length
const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum allowed full name length
const MAX_FULL_NAME_LENGTH: usize = 128;

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    // Only allow alphanumeric characters, underscores, and hyphens
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "Username can only contain alphanumeric characters, underscores, and hyphens"
                .to_string(),
        ));
    }
    Ok(())
}

/// Validate password length
fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_full_name(full_name: &str) -> Result<(), ApiError> {
    let len = full_name.trim().chars().count();
    if len == 0 || len > MAX_FULL_NAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Full name must be between 1 and {} characters",
            MAX_FULL_NAME_LENGTH
        )));
    }
    Ok(())
}

// ==================== User Routes ====================

/// GET /api/users (Admin only)
async fn list_users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/users (Admin only)
async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    validate_username(&request.username)?;
    validate_password(&request.password)?;
    validate_full_name(&request.full_name)?;

    let role: Role = request
        .role
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid role: {}", request.role)))?;

    debug!("Creating user: {}", request.username);

    let password_hash = hash_password(&request.password)?;
    let user = state
        .db
        .insert_user(NewUser {
            username: request.username,
            password_hash,
            full_name: request.full_name.trim().to_string(),
            role,
        })
        .await?;

    info!("{} created user {} ({})", admin.username, user.username, user.role);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /api/users/{id} (Admin only)
async fn get_user(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User: {}", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /api/users/{id} (Admin only)
///
/// Also revokes every session the user holds.
async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if admin.id == id {
        return Err(ApiError::BadRequest(
            "Administrators cannot delete their own account".to_string(),
        ));
    }

    debug!("Deleting user: {}", id);

    if !state.db.delete_user(id).await? {
        return Err(ApiError::NotFound(format!("User: {}", id)));
    }
    state.sessions.revoke_user_sessions(id).await?;

    info!("{} deleted user {}", admin.username, id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/students (Admin or teacher)
async fn list_students(
    _staff: RequireStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.db.list_users().await?;
    Ok(Json(
        users
            .into_iter()
            .filter(|u| u.role == Role::Siswa)
            .map(UserResponse::from)
            .collect(),
    ))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", get(get_user).delete(delete_user))
        .route("/api/students", get(list_students))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_admin_endpoint_with_student_session_is_forbidden() {
        let app = TestApp::new().await;
        let token = app.login("siswa1").await;

        let response = app.get("/api/users", Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.body, serde_json::json!({ "error": "Forbidden" }));
    }

    #[tokio::test]
    async fn test_admin_endpoint_without_cookie_is_unauthorized() {
        let app = TestApp::new().await;

        // API routes are not redirected at the edge
        let response = app.get("/api/users", None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body, serde_json::json!({ "error": "Unauthorized" }));
        assert!(response.location.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_unauthorized() {
        let app = TestApp::new().await;
        let token = app.login("admin1").await;
        app.clock.advance(chrono::Duration::days(7));

        let response = app.get("/api/users", Some(&token)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_lists_users_without_hashes() {
        let app = TestApp::new().await;
        let token = app.login("admin1").await;

        let response = app.get("/api/users", Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK);
        let users = response.body.as_array().unwrap();
        assert_eq!(users.len(), 3);
        assert!(!response.text.contains("argon2"));
    }

    #[tokio::test]
    async fn test_staff_endpoint() {
        let app = TestApp::new().await;

        let guru = app.login("guru1").await;
        let response = app.get("/api/students", Some(&guru)).await;
        assert_eq!(response.status, StatusCode::OK);
        let students = response.body.as_array().unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0]["username"], "siswa1");

        let siswa = app.login("siswa1").await;
        let response = app.get("/api/students", Some(&siswa)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_role_in_body_is_not_trusted_for_authorization() {
        let app = TestApp::new().await;
        let token = app.login("guru1").await;

        let response = app
            .post_json(
                "/api/users",
                r#"{"username":"x","password":"password1","full_name":"X","role":"ADMIN","as_role":"ADMIN"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_user_then_login() {
        let app = TestApp::new().await;
        let token = app.login("admin1").await;

        let response = app
            .post_json(
                "/api/users",
                r#"{"username":"siswa2","password":"rahasia123","full_name":"Siswa Dua","role":"SISWA"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["role"], "SISWA");

        let response = app
            .post_json(
                "/api/auth/login",
                r#"{"username":"siswa2","password":"rahasia123"}"#,
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let app = TestApp::new().await;
        let token = app.login("admin1").await;

        let bad_role = app
            .post_json(
                "/api/users",
                r#"{"username":"x1","password":"password1","full_name":"X","role":"KEPALA"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

        let short_password = app
            .post_json(
                "/api/users",
                r#"{"username":"x1","password":"short","full_name":"X","role":"GURU"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(short_password.status, StatusCode::BAD_REQUEST);

        let missing_field = app
            .post_json(
                "/api/users",
                r#"{"username":"x1","password":"password1"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
        assert!(missing_field.body["error"].as_str().unwrap().contains("full_name"));

        let not_json = app.post_json("/api/users", "{username", Some(&token)).await;
        assert_eq!(not_json.status, StatusCode::BAD_REQUEST);
        assert!(not_json.body["error"].is_string());

        let duplicate = app
            .post_json(
                "/api/users",
                r#"{"username":"guru1","password":"password1","full_name":"X","role":"GURU"}"#,
                Some(&token),
            )
            .await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_delete_user_revokes_sessions() {
        let app = TestApp::new().await;
        let admin = app.login("admin1").await;
        let siswa = app.login("siswa1").await;
        let siswa_id = app.get("/api/auth/me", Some(&siswa)).await.body["id"]
            .as_i64()
            .unwrap();

        let response = app.delete(&format!("/api/users/{}", siswa_id), Some(&admin)).await;
        assert_eq!(response.status, StatusCode::NO_CONTENT);
        assert_eq!(app.db.count_sessions_for_user(siswa_id).await.unwrap(), 0);

        let response = app.get("/api/auth/me", Some(&siswa)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);

        let response = app.delete(&format!("/api/users/{}", siswa_id), Some(&admin)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_self() {
        let app = TestApp::new().await;
        let admin = app.login("admin1").await;
        let admin_id = app.get("/api/auth/me", Some(&admin)).await.body["id"]
            .as_i64()
            .unwrap();

        let response = app.delete(&format!("/api/users/{}", admin_id), Some(&admin)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
