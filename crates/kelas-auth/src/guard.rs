//! Handler-level authorization
//!
//! The authoritative check: resolves the session token to a principal and
//! compares its role with what the endpoint declares. Unknown, expired and
//! revoked tokens all end as `Unauthenticated`; a live session with the
//! wrong role ends as `Forbidden`.

use kelas_db::Role;
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::session::{AuthenticatedPrincipal, SessionManager};

/// Role an endpoint demands of its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any logged-in user
    Authenticated,
    /// One of the listed roles
    AnyOf(&'static [Role]),
}

impl RoleRequirement {
    pub const ADMIN: Self = RoleRequirement::AnyOf(&[Role::Admin]);
    pub const GURU: Self = RoleRequirement::AnyOf(&[Role::Guru]);
    pub const SISWA: Self = RoleRequirement::AnyOf(&[Role::Siswa]);
    pub const STAFF: Self = RoleRequirement::AnyOf(&[Role::Admin, Role::Guru]);

    pub fn permits(&self, role: Role) -> bool {
        match self {
            RoleRequirement::Authenticated => true,
            RoleRequirement::AnyOf(roles) => roles.contains(&role),
        }
    }
}

/// Compare an already-resolved principal against a requirement
pub fn authorize(
    principal: &AuthenticatedPrincipal,
    requirement: RoleRequirement,
) -> Result<(), AuthError> {
    if requirement.permits(principal.role) {
        Ok(())
    } else {
        debug!(
            "Denied {} ({}) for {:?}",
            principal.username, principal.role, requirement
        );
        Err(AuthError::Forbidden)
    }
}

/// Resolves tokens and enforces role requirements
#[derive(Clone)]
pub struct RoleGuard {
    sessions: Arc<SessionManager>,
}

impl RoleGuard {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    /// Run the full check for one request
    ///
    /// Store failures come back as server errors, never as an auth verdict.
    pub async fn check(
        &self,
        token: Option<&str>,
        requirement: RoleRequirement,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let token = token.ok_or(AuthError::Unauthenticated)?;

        let principal = self
            .sessions
            .validate_session(token)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        authorize(&principal, requirement)?;

        debug!("Authorized user: {} ({})", principal.username, principal.role);
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;
    use chrono::Duration;
    use kelas_db::{Database, NewUser};

    fn principal(role: Role) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            id: 7,
            username: "u".to_string(),
            full_name: "U".to_string(),
            role,
        }
    }

    #[test]
    fn test_requirement_permits() {
        assert!(RoleRequirement::Authenticated.permits(Role::Siswa));
        assert!(RoleRequirement::ADMIN.permits(Role::Admin));
        assert!(!RoleRequirement::ADMIN.permits(Role::Guru));
        assert!(RoleRequirement::STAFF.permits(Role::Guru));
        assert!(!RoleRequirement::STAFF.permits(Role::Siswa));
        assert!(!RoleRequirement::SISWA.permits(Role::Admin));
    }

    #[test]
    fn test_authorize_is_forbidden_on_mismatch() {
        assert!(authorize(&principal(Role::Admin), RoleRequirement::ADMIN).is_ok());
        assert!(matches!(
            authorize(&principal(Role::Siswa), RoleRequirement::ADMIN),
            Err(AuthError::Forbidden)
        ));
    }

    async fn guard_with_user(role: Role) -> (RoleGuard, Arc<SessionManager>, String) {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                username: "someone".to_string(),
                password_hash: hash_password("pw").unwrap(),
                full_name: "Someone".to_string(),
                role,
            })
            .await
            .unwrap();
        let sessions = Arc::new(SessionManager::from_database(db, Duration::days(7)));
        let token = sessions.create_session(user.id).await.unwrap();
        (RoleGuard::new(sessions.clone()), sessions, token)
    }

    #[tokio::test]
    async fn test_check_states() {
        let (guard, sessions, token) = guard_with_user(Role::Siswa).await;

        // No token
        assert!(matches!(
            guard.check(None, RoleRequirement::Authenticated).await,
            Err(AuthError::Unauthenticated)
        ));

        // Unknown token
        assert!(matches!(
            guard.check(Some("bogus"), RoleRequirement::Authenticated).await,
            Err(AuthError::Unauthenticated)
        ));

        // Valid, role matches
        let principal = guard.check(Some(&token), RoleRequirement::SISWA).await.unwrap();
        assert_eq!(principal.role, Role::Siswa);

        // Valid, role mismatch
        assert!(matches!(
            guard.check(Some(&token), RoleRequirement::ADMIN).await,
            Err(AuthError::Forbidden)
        ));

        // Revoked
        sessions.delete_session(&token).await.unwrap();
        assert!(matches!(
            guard.check(Some(&token), RoleRequirement::SISWA).await,
            Err(AuthError::Unauthenticated)
        ));
    }
}
