//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kelas_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No session, or a session that is unknown, expired or revoked
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Valid session whose role does not satisfy the endpoint
    #[error("Insufficient permissions")]
    Forbidden,

    /// Login rejected; unknown user and wrong password look the same
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Configured lifetime pushes the expiry past the representable range
    #[error("Session lifetime out of range")]
    SessionLifetime,
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Store(_) | AuthError::PasswordHash(_) | AuthError::SessionLifetime => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Server-side failure, as opposed to a verdict about the caller
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Unauthenticated => "Unauthorized".to_string(),
            AuthError::Forbidden => "Forbidden".to_string(),
            AuthError::InvalidCredentials => "Invalid username or password".to_string(),
            AuthError::Store(_) | AuthError::PasswordHash(_) | AuthError::SessionLifetime => {
                // Full detail stays in the log
                error!("Authentication backend failure: {}", self);
                "Internal server error".to_string()
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (status, body) = body_of(AuthError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, body) = body_of(AuthError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");

        let (status, body) = body_of(AuthError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_store_errors_do_not_leak_detail() {
        let err = AuthError::Store(DbError::Duplicate("users row 7 for admin1".into()));
        assert!(err.is_server_error());

        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body.to_string().contains("admin1"));
    }
}
