//! Kelas - role-gated learning management backend

use anyhow::{Context, Result};
use chrono::Duration;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use kelas_api::{AppState, create_router};
use kelas_auth::{CookieSettings, PathPolicy, SessionManager};
use kelas_db::{Database, NewUser, Role};

/// Kelas - session-authenticated LMS backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "KELAS_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "KELAS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let (config, source) = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    info!("Starting Kelas v{}", env!("CARGO_PKG_VERSION"));
    match source {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("Config file not found at {}, using defaults", args.config),
    }
    config.warn_insecure();

    // Create data directory
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    // Create default admin user if no users exist
    if !db.has_users().await? {
        info!("Creating default admin user");
        let password_hash = kelas_auth::hash_password(&config.auth.initial_admin_password)?;
        db.insert_user(NewUser {
            username: "admin".to_string(),
            password_hash,
            full_name: "Administrator".to_string(),
            role: Role::Admin,
        })
        .await?;
        info!("Default admin user created (username: admin)");
    }

    // Initialize session manager
    let ttl = Duration::try_hours(config.auth.session_ttl_hours)
        .context("auth.session_ttl_hours is out of range")?;
    let sessions = Arc::new(SessionManager::from_database(db.clone(), ttl));

    if config.auth.sweep_interval_secs > 0 {
        spawn_session_sweep(sessions.clone(), config.auth.sweep_interval_secs);
    }

    // Install metrics recorder
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    // Create application state
    let state = AppState::new(
        db,
        sessions,
        PathPolicy::default(),
        CookieSettings::new(config.auth.secure_cookie, ttl),
    )?;

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Periodically delete expired sessions
fn spawn_session_sweep(sessions: Arc<SessionManager>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            if let Err(e) = sessions.purge_expired().await {
                error!("Session sweep failed: {}", e);
            }
        }
    });
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
