//! Opaque session token management
//!
//! Tokens are 256-bit random values handed to the client once. The store
//! only ever sees their SHA-256 digest. Expiry is absolute from creation:
//! validating a session never extends it.

use chrono::Duration;
use kelas_db::{CredentialStore, Database, NewSession, Role, SessionStore, User};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::AuthError;
use crate::password::{dummy_hash, verify_password};

/// Default session lifetime (7 days)
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 7 * 24;

/// Random bytes per token
const TOKEN_BYTES: usize = 32;

/// Tokens longer than this were not issued here and are rejected unhashed
const MAX_TOKEN_LENGTH: usize = 128;

/// The identity handlers may trust for authorization decisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedPrincipal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

/// Session manager for issuing, resolving and revoking login sessions
pub struct SessionManager {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager over explicit stores
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        ttl: Duration,
    ) -> Self {
        info!("Initializing session manager (ttl: {} hours)", ttl.num_hours());

        Self {
            credentials,
            sessions,
            clock: Arc::new(SystemClock),
            ttl,
        }
    }

    /// Create a session manager backed by one database for both stores
    pub fn from_database(db: Database, ttl: Duration) -> Self {
        let db = Arc::new(db);
        Self::new(db.clone(), db, ttl)
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Check a username/password pair
    ///
    /// `Ok(None)` covers both an unknown username and a wrong password. A
    /// password is verified in either case so the two take the same time.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let user = self.credentials.find_user_by_username(username).await?;

        let hash = match &user {
            Some(u) => u.password_hash.as_str(),
            None => dummy_hash(),
        };
        let password_valid = verify_password(password, hash)?;

        match (user, password_valid) {
            (Some(user), true) => {
                metrics::counter!("kelas_logins_total", "outcome" => "success").increment(1);
                Ok(Some(user))
            }
            _ => {
                metrics::counter!("kelas_logins_total", "outcome" => "rejected").increment(1);
                Ok(None)
            }
        }
    }

    /// Issue a new session for a user and return its token
    ///
    /// Any failure here is a server error; the caller already authenticated.
    pub async fn create_session(&self, user_id: i64) -> Result<String, AuthError> {
        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::SessionLifetime)?;
        let token = generate_token();

        self.sessions
            .insert_session(NewSession {
                token_hash: token_digest(&token),
                user_id,
                created_at,
                expires_at,
            })
            .await?;

        metrics::counter!("kelas_sessions_created_total").increment(1);
        debug!("Issued session for user {}", user_id);
        Ok(token)
    }

    /// Resolve a token to its principal
    ///
    /// `Ok(None)` for unknown, revoked and expired tokens as well as for
    /// sessions whose user no longer exists. Read-only.
    pub async fn validate_session(
        &self,
        token: &str,
    ) -> Result<Option<AuthenticatedPrincipal>, AuthError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Ok(None);
        }

        let Some(session) = self.sessions.find_session(&token_digest(token)).await? else {
            return Ok(None);
        };

        if session.is_expired_at(self.clock.now()) {
            debug!("Rejected expired session for user {}", session.user_id);
            return Ok(None);
        }

        let Some(user) = self.credentials.find_user_by_id(session.user_id).await? else {
            debug!("Rejected orphaned session for missing user {}", session.user_id);
            return Ok(None);
        };

        Ok(Some(AuthenticatedPrincipal::from(&user)))
    }

    /// Revoke a session; unknown tokens are not an error
    pub async fn delete_session(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Ok(());
        }

        if self.sessions.remove_session(&token_digest(token)).await? {
            debug!("Revoked session");
        }
        Ok(())
    }

    /// Revoke every session of a user
    pub async fn revoke_user_sessions(&self, user_id: i64) -> Result<u64, AuthError> {
        let removed = self.sessions.remove_sessions_for_user(user_id).await?;
        if removed > 0 {
            info!("Revoked {} session(s) of user {}", removed, user_id);
        }
        Ok(removed)
    }

    /// Delete sessions that have expired
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let removed = self.sessions.remove_expired_sessions(self.clock.now()).await?;
        if removed > 0 {
            metrics::counter!("kelas_sessions_purged_total").increment(removed);
            info!("Purged {} expired session(s)", removed);
        }
        Ok(removed)
    }
}

/// Generate a fresh hex-encoded token
fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Digest under which a token is stored
fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
