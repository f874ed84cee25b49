//! Service configuration loaded from defaults, a YAML file, and the environment.
//!
//! Sources are layered, later ones winning:
//!
//! 1. Built-in defaults
//! 2. YAML file (`ADDRESSBOOK_CONFIG`, default `./config.yaml`)
//! 3. Environment variables (a `.env` file is loaded first if present)
//!
//! # Environment Variables
//!
//! - `ADDRESSBOOK_CONFIG` - Path to the YAML config file (must exist if set)
//! - `DATABASE_URL` - Full `PostgreSQL` URL, overrides the individual parts
//! - `DATABASE_HOST` - Database host (default: localhost)
//! - `DATABASE_PORT` - Database port (default: 5432)
//! - `DATABASE_USER` - Database user (default: addressbook)
//! - `DATABASE_PASSWORD` - Database password (default: addressbook)
//! - `DATABASE_NAME` - Database name (default: addressbook)
//! - `SERVER_HOST` - Bind address, IP or hostname (default: localhost)
//! - `SERVER_PORT` - Listen port (default: 8080)
//! - `SERVER_PID_FILE` - PID file path (default: ./addressbook.pid)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! # Example file
//!
//! ```yaml
//! database:
//!   host: db.internal
//!   port: 5432
//!   user: addressbook
//!   password: hunter2
//!   name: addressbook
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! ```

use std::fmt::Display;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "ADDRESSBOOK_CONFIG";

/// Config file used when `ADDRESSBOOK_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_DATABASE_HOST: &str = "localhost";
const DEFAULT_DATABASE_PORT: u16 = 5432;
const DEFAULT_DATABASE_USER: &str = "addressbook";
const DEFAULT_DATABASE_PASSWORD: &str = "addressbook";
const DEFAULT_DATABASE_NAME: &str = "addressbook";
const DEFAULT_SERVER_HOST: &str = "localhost";
const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_PID_FILE: &str = "addressbook.pid";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Failed to read config file {path}: {err}", path = .0.display(), err = .1)]
    ReadFile(PathBuf, #[source] std::io::Error),
    #[error("Invalid config file {path}: {reason}", path = .0.display(), reason = .1)]
    InvalidFile(PathBuf, String),
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
}

/// Complete service configuration.
///
/// Built once at startup and passed by reference to the pool and server setup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Relational store connection settings
    pub database: DatabaseConfig,
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Error tracking settings
    pub sentry: SentryConfig,
}

/// `PostgreSQL` connection settings.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; when set the individual parts are ignored
    pub url: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address or hostname to bind the server to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// File the process ID is written to at startup
    pub pid_file: PathBuf,
}

/// Sentry error tracking settings.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when absent
    pub dsn: Option<String>,
    /// Environment tag attached to events
    pub environment: Option<String>,
}

// =============================================================================
// File Layer
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    database: FileDatabaseConfig,
    server: FileServerConfig,
    sentry: FileSentryConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileDatabaseConfig {
    url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileServerConfig {
    host: Option<String>,
    port: Option<u16>,
    pid_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSentryConfig {
    dsn: Option<String>,
    environment: Option<String>,
}

impl FileConfig {
    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidFile(path.to_path_buf(), e.to_string()))
    }

    /// Read the config file, treating a missing default file as empty.
    fn read(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::MissingFile(path));
            }
            tracing::debug!(path = %path.display(), "No config file found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile(path.clone(), e))?;
        Self::parse(&path, &content)
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, and the environment.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the named config file is missing or malformed,
    /// or if an environment variable holds an unparsable value.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let file = FileConfig::read(get_optional_env(CONFIG_PATH_ENV).map(PathBuf::from))?;
        Self::from_layers(file, get_optional_env)
    }

    /// Load configuration from a YAML string and an environment lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the YAML is malformed or a value fails to parse.
    pub fn from_yaml_and_env<F>(yaml: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = FileConfig::parse(Path::new("<inline>"), yaml)?;
        Self::from_layers(file, env)
    }

    fn from_layers<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db = file.database;
        let database = DatabaseConfig {
            url: env("DATABASE_URL").or(db.url).map(SecretString::from),
            host: env("DATABASE_HOST")
                .or(db.host)
                .unwrap_or_else(|| DEFAULT_DATABASE_HOST.to_string()),
            port: resolve(&env, "DATABASE_PORT", db.port, DEFAULT_DATABASE_PORT)?,
            user: env("DATABASE_USER")
                .or(db.user)
                .unwrap_or_else(|| DEFAULT_DATABASE_USER.to_string()),
            password: SecretString::from(
                env("DATABASE_PASSWORD")
                    .or(db.password)
                    .unwrap_or_else(|| DEFAULT_DATABASE_PASSWORD.to_string()),
            ),
            name: env("DATABASE_NAME")
                .or(db.name)
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
        };

        let srv = file.server;
        let server = ServerConfig {
            host: env("SERVER_HOST")
                .or(srv.host)
                .map(|host| host.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            port: resolve(&env, "SERVER_PORT", srv.port, DEFAULT_SERVER_PORT)?,
            pid_file: env("SERVER_PID_FILE")
                .map(PathBuf::from)
                .or(srv.pid_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PID_FILE)),
        };

        if server.host.is_empty() {
            return Err(ConfigError::EmptyValue("SERVER_HOST"));
        }

        let sentry = SentryConfig {
            dsn: env("SENTRY_DSN").or(file.sentry.dsn),
            environment: env("SENTRY_ENVIRONMENT").or(file.sentry.environment),
        };

        Ok(Self {
            database,
            server,
            sentry,
        })
    }

    /// Returns the `host:port` string for binding the server.
    ///
    /// Hostnames are resolved when binding; IPv6 literals are bracketed.
    #[must_use]
    pub fn bind_address(&self) -> String {
        let ServerConfig { host, port, .. } = &self.server;
        match host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{ip}]:{port}"),
            _ => format!("{host}:{port}"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Pick the environment value if set, else the file value, else the default.
fn resolve<T, F>(env: &F, key: &str, file: Option<T>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(file.unwrap_or(default)),
    }
}
