//! Authorization extractors
//!
//! A handler only gets an [`AuthenticatedPrincipal`] by naming one of these
//! in its signature, so the role check cannot be forgotten.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use kelas_auth::{AuthenticatedPrincipal, RoleRequirement, SESSION_COOKIE};

use crate::error::ApiError;
use crate::state::AppState;

/// Session token from the cookie jar, if a non-empty one is present
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

async fn require<S>(
    parts: &Parts,
    state: &S,
    requirement: RoleRequirement,
) -> Result<AuthenticatedPrincipal, ApiError>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let app_state = AppState::from_ref(state);
    let jar = CookieJar::from_headers(&parts.headers);
    let token = session_token(&jar);

    Ok(app_state.guard.check(token.as_deref(), requirement).await?)
}

/// Extractor for authenticated user (required)
pub struct RequireAuth(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require(parts, state, RoleRequirement::Authenticated)
            .await
            .map(RequireAuth)
    }
}

/// Extractor for admin user (required)
pub struct RequireAdmin(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require(parts, state, RoleRequirement::ADMIN)
            .await
            .map(RequireAdmin)
    }
}

/// Extractor for admin or teacher (required)
pub struct RequireStaff(pub AuthenticatedPrincipal);

impl<S> FromRequestParts<S> for RequireStaff
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require(parts, state, RoleRequirement::STAFF)
            .await
            .map(RequireStaff)
    }
}
