//! Login, logout and current-user endpoints

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::header::SET_COOKIE,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use kelas_auth::{AuthError, AuthenticatedPrincipal};
use tracing::{debug, error, info, warn};

use crate::error::ApiError;
use crate::extract::{RequireAuth, session_token};
use crate::state::AppState;

use super::types::{LoginRequest, LoginResponse, LogoutResponse};

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Pull both credentials out of the body or explain what is missing
fn credentials(request: LoginRequest) -> Result<(String, String), ApiError> {
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    if username.trim().is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok((username, password))
}

// ==================== Auth Routes ====================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e.body_text())))?;
    let (username, password) = credentials(request)?;

    debug!("Login attempt for user: {}", username);

    let user = match state.sessions.authenticate(&username, &password).await? {
        Some(user) => user,
        None => {
            warn!("Failed login for user: {}", username);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    // Authenticated but no session: the client must log in again
    let token = state.sessions.create_session(user.id).await.inspect_err(|e| {
        error!("Session issuance failed for user {}: {}", user.username, e);
    })?;

    info!("User {} ({}) logged in", user.username, user.role);

    Ok((
        [(SET_COOKIE, state.cookies.issue(&token))],
        Json(LoginResponse {
            success: true,
            user: AuthenticatedPrincipal::from(&user),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Always succeeds and always clears the cookie.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        match state.sessions.delete_session(&token).await {
            Ok(()) => info!("Session logged out"),
            Err(e) => error!("Failed to delete session on logout: {}", e),
        }
    }

    (
        [(SET_COOKIE, state.cookies.clear())],
        Json(LogoutResponse { success: true }),
    )
}

/// GET /api/auth/me
async fn me(RequireAuth(principal): RequireAuth) -> Json<AuthenticatedPrincipal> {
    Json(principal)
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}
