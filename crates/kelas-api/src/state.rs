//! Application state

use kelas_auth::{CookieSettings, PathPolicy, RoleGuard, SessionManager};
use kelas_db::Database;
use std::sync::Arc;

use crate::routes::pages::PageTemplates;

/// Prometheus render handle
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Arc<SessionManager>,
    pub guard: RoleGuard,
    pub policy: Arc<PathPolicy>,
    pub cookies: CookieSettings,
    pub(crate) templates: Arc<PageTemplates>,
}

impl AppState {
    /// Fails only if an embedded page template does not parse
    pub fn new(
        db: Database,
        sessions: Arc<SessionManager>,
        policy: PathPolicy,
        cookies: CookieSettings,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            db,
            guard: RoleGuard::new(sessions.clone()),
            sessions,
            policy: Arc::new(policy),
            cookies,
            templates: Arc::new(PageTemplates::new()?),
        })
    }
}
