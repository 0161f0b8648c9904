//! Request/Response DTOs

use kelas_auth::AuthenticatedPrincipal;
use serde::{Deserialize, Serialize};

// ==================== Auth Types ====================

/// Login request
///
/// Fields are optional so a missing one is a 400 with our own message
/// rather than a body rejection.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: AuthenticatedPrincipal,
}

/// Logout response
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ==================== User Types ====================

/// Create user request
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

/// User response (without password)
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub created_at: String,
}

impl From<kelas_db::User> for UserResponse {
    fn from(u: kelas_db::User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            full_name: u.full_name,
            role: u.role.as_str().to_string(),
            created_at: u.created_at.to_rfc3339(),
        }
    }
}
