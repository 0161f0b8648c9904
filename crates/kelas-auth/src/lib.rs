//! Kelas Authentication and Authorization
//!
//! This crate provides opaque-token session authentication and
//! role-based access control for Kelas. Enforcement is split in two
//! stages: a pure [`PathPolicy`] that only looks at the request path and
//! whether a session cookie is present, and a [`RoleGuard`] that resolves
//! the cookie to a principal through the [`SessionManager`].

pub mod clock;
pub mod cookie;
pub mod error;
pub mod guard;
pub mod password;
pub mod policy;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie::{CookieSettings, SESSION_COOKIE};
pub use error::AuthError;
pub use guard::{RoleGuard, RoleRequirement, authorize};
pub use password::{hash_password, verify_password};
pub use policy::{EdgeDecision, PageRoute, PathPolicy};
pub use session::{AuthenticatedPrincipal, SessionManager};
