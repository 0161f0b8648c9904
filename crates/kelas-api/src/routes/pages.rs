//! Page routes
//!
//! Bare HTML placeholders for the front end. Role checks for everything
//! under `/dashboard` happen in [`crate::middleware::page_dispatch`]; the
//! handlers here read the principal it leaves behind.

use axum::{
    Extension, Router,
    extract::{Query, State},
    response::{Html, Response},
    routing::get,
};
use kelas_auth::{AuthenticatedPrincipal, policy::sanitize_return_target};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::error::ApiError;
use crate::middleware::found;
use crate::state::AppState;

const TPL_LOGIN: &str = include_str!("templates/login.html");
const TPL_DASHBOARD: &str = include_str!("templates/dashboard.html");

/// Embedded page templates
///
/// Names end in `.html`, so Tera autoescapes every interpolated value.
pub struct PageTemplates {
    tera: Tera,
}

impl PageTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("login.html", TPL_LOGIN)?;
        tera.add_raw_template("dashboard.html", TPL_DASHBOARD)?;
        Ok(Self { tera })
    }

    fn render(&self, name: &str, context: &Context) -> Result<Html<String>, ApiError> {
        Ok(Html(self.tera.render(name, context)?))
    }
}

#[derive(Deserialize)]
struct LoginPageQuery {
    redirect: Option<String>,
}

/// GET /login
async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginPageQuery>,
) -> Result<Html<String>, ApiError> {
    let target = query
        .redirect
        .as_deref()
        .and_then(sanitize_return_target)
        .unwrap_or(state.policy.dashboard_path());

    let mut context = Context::new();
    context.insert("redirect", target);
    state.templates.render("login.html", &context)
}

/// GET /
async fn root(State(state): State<AppState>) -> Response {
    found(state.policy.dashboard_path())
}

/// GET /dashboard
///
/// Generic entry: forwards to the dashboard of the caller's role.
async fn dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Response {
    found(&state.policy.dashboard_for(principal.role))
}

/// GET /dashboard/{admin,guru,siswa}
async fn role_dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> Result<Html<String>, ApiError> {
    let mut context = Context::new();
    context.insert("role", principal.role.as_str());
    context.insert("full_name", &principal.full_name);
    state.templates.render("dashboard.html", &context)
}

/// Create page routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_page))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/admin", get(role_dashboard))
        .route("/dashboard/guru", get(role_dashboard))
        .route("/dashboard/siswa", get(role_dashboard))
}
