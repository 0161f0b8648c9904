//! Request pipeline middleware
//!
//! `edge_guard` runs first and is a thin wrapper over
//! [`kelas_auth::PathPolicy::evaluate`]. `page_dispatch` runs after it and
//! enforces the page route table through the role guard, so no page
//! handler has to remember its own check.

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use kelas_auth::{AuthError, EdgeDecision};
use tracing::debug;

use crate::extract::session_token;
use crate::state::AppState;

/// 302 Found with the given location
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Path/cookie-presence filter applied before routing
pub async fn edge_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_token = session_token(&jar).is_some();
    let path = request.uri().path().to_string();

    match state.policy.evaluate(&path, has_token) {
        EdgeDecision::Continue => next.run(request).await,
        EdgeDecision::Redirect(location) => {
            debug!("Edge redirect {} -> {}", path, location);
            found(&location)
        }
    }
}

/// Central role enforcement for page routes
///
/// On success the principal is stored in the request extensions for the
/// page handler. A session that no longer validates is sent back to the
/// login page with its cookie cleared, otherwise the login page would
/// bounce it straight back here.
pub async fn page_dispatch(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let Some(requirement) = state.policy.page_requirement(&path) else {
        return next.run(request).await;
    };

    let token = session_token(&jar);
    match state.guard.check(token.as_deref(), requirement).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(AuthError::Unauthenticated) => {
            debug!("Stale session on {}, back to login", path);
            let mut response = found(&state.policy.login_redirect(&path));
            if let Ok(value) = state.cookies.clear().parse() {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            response
        }
        Err(e) => e.into_response(),
    }
}
