//! Address book API server.
//!
//! Serves the users and addresses REST API on port 8080 by default.
//!
//! # Architecture
//!
//! - Axum web framework with JSON request and response bodies
//! - `PostgreSQL` via sqlx for users and addresses
//! - Sentry and `tracing` for error tracking and structured logs
//!
//! Configuration comes from built-in defaults, then an optional YAML file,
//! then environment variables. See [`addressbook_api::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::fmt::Display;
use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, ServiceExt, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use sqlx::PgPool;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use addressbook_api::config::{AppConfig, SentryConfig};
use addressbook_api::db::{self, PgAddressRepository, PgUserRepository};
use addressbook_api::state::AppState;
use addressbook_api::{middleware, routes};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &SentryConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.environment.clone().map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Log a startup failure and exit with status 1.
fn fatal(context: &str, err: impl Display) -> ! {
    tracing::error!(error = %err, "{context}");
    std::process::exit(1);
}

/// Load configuration, exiting with status 1 on error.
///
/// Runs before the tracing subscriber exists, so failures go to stderr.
#[allow(clippy::print_stderr)]
fn load_config() -> AppConfig {
    AppConfig::load().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

#[tokio::main]
async fn main() {
    // Configuration comes first since Sentry needs it
    let config = load_config();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config.sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "addressbook_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    tracing::debug!(?config, "Configuration loaded");

    let pool = db::create_pool(&config.database)
        .await
        .unwrap_or_else(|err| fatal("Failed to connect to database", err));
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p addressbook-cli -- migrate

    let pid_file = config.server.pid_file.clone();
    write_pid_file(&pid_file)
        .await
        .unwrap_or_else(|err| fatal("Failed to write PID file", err));

    let state = AppState::new(
        PgUserRepository::new(pool.clone()),
        PgAddressRepository::new(pool.clone()),
    );

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .with_state(pool.clone());

    let app = middleware::apply(routes::router(state).merge(health_routes));

    // Path normalization must wrap the router so it runs before routing
    let app = NormalizePathLayer::trim_trailing_slash().layer(app);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .unwrap_or_else(|err| fatal(&format!("Failed to bind to {addr}"), err));
    let local_addr = listener
        .local_addr()
        .unwrap_or_else(|err| fatal("Failed to read listener address", err));
    tracing::info!("addressbook-api listening on {}", local_addr);

    let served = axum::serve(listener, ServiceExt::<axum::extract::Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close().await;
    if let Err(err) = tokio::fs::remove_file(&pid_file).await {
        tracing::warn!(error = %err, path = %pid_file.display(), "Failed to remove PID file");
    }

    if let Err(err) = served {
        fatal("Server error", err);
    }
    tracing::info!("Server stopped");
}

/// Write this process's ID to `path`, creating parent directories.
async fn write_pid_file(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format!("{}\n", std::process::id())).await?;
    tracing::info!(path = %path.display(), "PID file written");
    Ok(())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(pool): State<PgPool>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(&pool).await {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
