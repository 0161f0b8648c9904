//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Session and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Absolute session lifetime
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure`
    #[serde(default = "default_secure_cookie")]
    pub secure_cookie: bool,
    /// How often expired sessions are deleted; 0 disables the sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Password for the `admin` account created on an empty database
    #[serde(default = "default_initial_admin_password")]
    pub initial_admin_password: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            secure_cookie: default_secure_cookie(),
            sweep_interval_secs: default_sweep_interval_secs(),
            initial_admin_password: default_initial_admin_password(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_db_path() -> String {
    "./data/kelas.db".to_string()
}

fn default_session_ttl_hours() -> i64 {
    kelas_auth::session::DEFAULT_SESSION_TTL_HOURS
}

fn default_secure_cookie() -> bool {
    true
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

/// Ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 10 * 365 * 24;

pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

fn default_initial_admin_password() -> String {
    DEFAULT_ADMIN_PASSWORD.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Config {
    /// Load configuration from a file
    ///
    /// Runs before logging is set up, so it reports through its result:
    /// `None` in the second slot means the file was missing and defaults
    /// were used.
    pub fn load(path: &str) -> Result<(Self, Option<&str>)> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            return Ok((Self::default(), None));
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        config.validate()?;

        Ok((config, Some(path)))
    }

    /// Reject values that cannot work
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.auth.session_ttl_hours) {
            anyhow::bail!(
                "auth.session_ttl_hours must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS,
                self.auth.session_ttl_hours
            );
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            );
        }
        Ok(())
    }

    /// Log settings that are fine for development but not for production
    pub fn warn_insecure(&self) {
        if !self.auth.secure_cookie {
            warn!("auth.secure_cookie is disabled; session cookies will be sent over plain HTTP");
        }
        if self.auth.initial_admin_password == DEFAULT_ADMIN_PASSWORD {
            warn!("auth.initial_admin_password is the default; change it before first start");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let (config, source) = Config::load("/definitely/not/here.toml").unwrap();
        assert!(source.is_none());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.session_ttl_hours, 168);
        assert!(config.auth.secure_cookie);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[auth]
secure_cookie = false
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let (config, source) = Config::load(path).unwrap();
        assert_eq!(source, Some(path));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert!(!config.auth.secure_cookie);
        assert_eq!(config.auth.sweep_interval_secs, 3600);
        assert_eq!(config.database.path, "./data/kelas.db");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nsession_ttl_hours = 0").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nsession_ttl_hours = 100000000000").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nsession_ttl_hours = {}", MAX_SESSION_TTL_HOURS).unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_ok());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nformat = \"xml\"").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = 1").unwrap();
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }
}
