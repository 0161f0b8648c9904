//! Edge path policy
//!
//! Runs before routing and sees only the path and whether a session cookie
//! is present. It never touches a store, so it cannot tell a live token
//! from a stale one and never looks at roles; that is the job of
//! [`crate::RoleGuard`]. The page route table is declared here as data and
//! enforced by the page dispatcher, not by [`PathPolicy::evaluate`].

use kelas_db::Role;

use crate::guard::RoleRequirement;

/// Query parameter carrying the originally requested path
pub const REDIRECT_PARAM: &str = "redirect";

/// Outcome of the edge check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    /// Hand the request to the router
    Continue,
    /// Answer with a redirect to this location
    Redirect(String),
}

/// Role requirement attached to a page path prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRoute {
    pub prefix: &'static str,
    pub requirement: RoleRequirement,
}

/// Page routes and the roles they demand
pub const PAGE_ROUTES: &[PageRoute] = &[
    PageRoute {
        prefix: "/dashboard/admin",
        requirement: RoleRequirement::ADMIN,
    },
    PageRoute {
        prefix: "/dashboard/guru",
        requirement: RoleRequirement::GURU,
    },
    PageRoute {
        prefix: "/dashboard/siswa",
        requirement: RoleRequirement::SISWA,
    },
    PageRoute {
        prefix: "/dashboard",
        requirement: RoleRequirement::Authenticated,
    },
];

#[derive(Debug, Clone)]
pub struct PathPolicy {
    login_path: String,
    dashboard_path: String,
    /// Always reachable without a session
    public_prefixes: Vec<String>,
    /// Not filtered at the edge; handlers answer 401 themselves
    excluded_prefixes: Vec<String>,
    page_routes: Vec<PageRoute>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            public_prefixes: vec!["/login".to_string(), "/api/auth/login".to_string()],
            excluded_prefixes: vec![
                "/api".to_string(),
                "/health".to_string(),
                "/healthz".to_string(),
                "/metrics".to_string(),
            ],
            page_routes: PAGE_ROUTES.to_vec(),
        }
    }
}

impl PathPolicy {
    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }

    /// Decide what to do with a request before it is routed
    pub fn evaluate(&self, path: &str, has_token: bool) -> EdgeDecision {
        if self.is_public(path) {
            // Optimistic: the token may be stale, in which case the
            // dashboard sends the user back here
            if has_token && path == self.login_path {
                return EdgeDecision::Redirect(self.dashboard_path.clone());
            }
            return EdgeDecision::Continue;
        }

        if self.is_excluded(path) {
            return EdgeDecision::Continue;
        }

        if !has_token {
            return EdgeDecision::Redirect(self.login_redirect(path));
        }

        EdgeDecision::Continue
    }

    /// Login URL that resumes at `path` after signing in
    pub fn login_redirect(&self, path: &str) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            REDIRECT_PARAM,
            urlencoding::encode(path)
        )
    }

    /// Requirement of the most specific page route covering `path`
    pub fn page_requirement(&self, path: &str) -> Option<RoleRequirement> {
        self.page_routes
            .iter()
            .filter(|route| matches_prefix(path, route.prefix))
            .max_by_key(|route| route.prefix.len())
            .map(|route| route.requirement)
    }

    /// Landing page for a role
    pub fn dashboard_for(&self, role: Role) -> String {
        let suffix = match role {
            Role::Admin => "admin",
            Role::Guru => "guru",
            Role::Siswa => "siswa",
        };
        format!("{}/{}", self.dashboard_path, suffix)
    }

    fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|p| matches_prefix(path, p))
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| matches_prefix(path, p))
    }
}

/// Segment-aware prefix match: `/login` covers `/login` and `/login/x`
/// but not `/loginx`
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

/// Accept a post-login return target only if it stays on this site
pub fn sanitize_return_target(target: &str) -> Option<&str> {
    let local = target.starts_with('/') && !target.starts_with("//") && !target.contains('\\');
    local.then_some(target)
}
