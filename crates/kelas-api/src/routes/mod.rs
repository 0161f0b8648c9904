//! API routes

mod auth;
mod health;
pub mod metrics;
pub(crate) mod pages;
pub mod types;
mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::middleware::{edge_guard, page_dispatch};
use crate::state::{AppState, MetricsHandle};

/// Fallback for unmatched routes
async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Create the main router
///
/// Layers run outermost first: the edge guard, then the page dispatcher,
/// then the route's own extractors.
pub fn create_router(state: AppState, metrics_handle: Option<MetricsHandle>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Login, logout, current user
        .merge(auth::routes())
        // User management
        .merge(users::routes())
        // Pages
        .merge(pages::routes())
        .fallback(not_found)
        .with_state(state.clone());

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
        .layer(from_fn_with_state(state.clone(), page_dispatch))
        .layer(from_fn_with_state(state, edge_guard))
}
