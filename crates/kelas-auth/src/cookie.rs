//! Session cookie attributes

use chrono::Duration;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Attributes applied to every `Set-Cookie` for the session
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Add `Secure`; disable only for plain-HTTP development setups
    pub secure: bool,
    /// Lifetime advertised on issuance
    pub max_age: Duration,
}

impl CookieSettings {
    pub fn new(secure: bool, max_age: Duration) -> Self {
        Self { secure, max_age }
    }

    /// `Set-Cookie` value that stores a freshly issued token
    pub fn issue(&self, token: &str) -> String {
        self.build(token, self.max_age.num_seconds())
    }

    /// `Set-Cookie` value that makes the browser drop the token immediately
    pub fn clear(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age_secs: i64) -> String {
        let secure_flag = if self.secure { "; Secure" } else { "" };

        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
            SESSION_COOKIE, value, max_age_secs, secure_flag
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_cookie_attributes() {
        let settings = CookieSettings::new(true, Duration::days(7));
        let cookie = settings.issue("abc123");

        assert!(cookie.starts_with("session_token=abc123;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie() {
        let settings = CookieSettings::new(false, Duration::days(7));
        let cookie = settings.clear();

        assert!(cookie.starts_with("session_token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}
