//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ab-cli migrate
//! ```
//!
//! Connection settings are read the same way the API server reads them:
//! defaults, then `config.yaml` (or `ADDRESSBOOK_CONFIG`), then environment
//! variables such as `DATABASE_URL`.
//!
//! # Migration Files
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile
//! time.

use thiserror::Error;

use addressbook_api::config::{AppConfig, ConfigError};
use addressbook_api::db;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is unreachable,
/// or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = AppConfig::load()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
