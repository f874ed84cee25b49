//! Seed the database with users and addresses from a YAML file.
//!
//! # File Format
//!
//! ```yaml
//! users:
//!   - firstName: Ada
//!     lastName: Lovelace
//!     addresses:
//!       - street: 12 St James's Square
//!         city: London
//!         type: home
//! ```
//!
//! The whole file is validated before connecting. Each user is inserted
//! with its addresses through the same repositories the API uses.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use addressbook_api::config::{AppConfig, ConfigError};
use addressbook_api::db::{
    self, AddressRepository, PgAddressRepository, PgUserRepository, RepositoryError,
    UserRepository,
};
use addressbook_api::models::{Address, User};
use addressbook_core::AddressId;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed file does not exist.
    #[error("File not found: {0}")]
    MissingFile(String),

    /// Seed file could not be read.
    #[error("Failed to read {0}: {1}")]
    Read(String, #[source] std::io::Error),

    /// Seed file is not valid YAML for this format.
    #[error("Failed to parse seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Seed file parsed but failed validation.
    #[error("{0} validation errors found")]
    Invalid(usize),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An insert failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Top-level seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// A user to insert, with the addresses they own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedUser {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub addresses: Vec<SeedAddress>,
}

/// An address owned by the enclosing [`SeedUser`].
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Summary of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub users: usize,
    pub addresses: usize,
}

/// Check a parsed seed file, returning one message per problem.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    for (i, user) in seed.users.iter().enumerate() {
        if user.first_name.trim().is_empty() {
            errors.push(format!("users[{i}]: firstName is empty"));
        }
        if user.last_name.trim().is_empty() {
            errors.push(format!("users[{i}]: lastName is empty"));
        }
    }

    errors
}

/// Insert every user and address in `seed`.
///
/// # Errors
///
/// Returns the first repository error; rows inserted before it remain.
pub async fn insert_all<U, A>(users: &U, addresses: &A, seed: SeedFile) -> Result<SeedResult, SeedError>
where
    U: UserRepository,
    A: AddressRepository,
{
    let mut result = SeedResult::default();

    for entry in seed.users {
        let user = users
            .insert_user(&User::new(entry.first_name, entry.last_name))
            .await?;
        result.users += 1;

        for address in entry.addresses {
            addresses
                .insert_address(&Address {
                    id: AddressId::new(),
                    user_id: user.id,
                    street: address.street,
                    city: address.city,
                    state: address.state,
                    zip: address.zip,
                    kind: address.kind,
                })
                .await?;
            result.addresses += 1;
        }

        info!(user_id = %user.id, "Seeded user");
    }

    Ok(result)
}

/// Seed users and addresses from a YAML file.
///
/// # Errors
///
/// Returns an error if the file is missing or invalid, configuration cannot
/// be loaded, or database operations fail.
pub async fn run(file_path: &str) -> Result<SeedResult, SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::MissingFile(file_path.to_string()));
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SeedError::Read(file_path.to_string(), e))?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let config = AppConfig::load()?;
    let pool = db::create_pool(&config.database).await?;
    info!("Connected to database");

    let result = insert_all(
        &PgUserRepository::new(pool.clone()),
        &PgAddressRepository::new(pool),
        seed,
    )
    .await?;

    info!("Seeding complete!");
    info!("  Users inserted: {}", result.users);
    info!("  Addresses inserted: {}", result.addresses);

    Ok(result)
}
