//! Kelas HTTP API
//!
//! This crate provides the Axum router for Kelas: the login/logout
//! endpoints, the edge guard and page dispatcher middleware, and the
//! typed extractors every protected handler goes through.

pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::{RequireAdmin, RequireAuth, RequireStaff};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
