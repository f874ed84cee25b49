//! Database operations for the address book `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - People in the address book
//! - `addresses` - Postal addresses, each owned by exactly one user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p addressbook-cli -- migrate
//! ```
//!
//! # Repositories
//!
//! Handlers only see the [`UserRepository`] and [`AddressRepository`] traits.
//! The `PostgreSQL` implementations hold a clone of the shared [`PgPool`] and
//! borrow a connection per operation.

pub mod addresses;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod users;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;
use uuid::Uuid;

use addressbook_core::{AddressId, UserId};

use crate::config::DatabaseConfig;
use crate::models::{Address, User};

pub use addresses::PgAddressRepository;
pub use users::PgUserRepository;

/// The kind of entity a repository operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Address,
}

impl Entity {
    /// Lowercase name used in client-facing messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Address => "address",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("User"),
            Self::Address => f.write_str("Address"),
        }
    }
}

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row matched the given identifier.
    #[error("{0} with Id [{1}] does not exist")]
    NotFound(Entity, Uuid),

    /// A write touched a different number of rows than expected.
    #[error("invalid number of rows written: {0}")]
    UnexpectedRowCount(u64),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    /// Not-found error for a user ID.
    #[must_use]
    pub fn user_not_found(id: UserId) -> Self {
        Self::NotFound(Entity::User, id.as_uuid())
    }

    /// Not-found error for an address ID.
    #[must_use]
    pub fn address_not_found(id: AddressId) -> Self {
        Self::NotFound(Entity::Address, id.as_uuid())
    }
}

/// Storage operations for users.
pub trait UserRepository: Clone + Send + Sync + 'static {
    /// List every user. Returns an empty vector when there are none.
    fn list_users(&self) -> impl Future<Output = Result<Vec<User>, RepositoryError>> + Send;

    /// Fetch a single user.
    ///
    /// Fails with `RepositoryError::NotFound` when no user has this ID.
    fn get_user(&self, id: UserId)
    -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Insert a user whose ID was generated by the caller.
    fn insert_user(&self, user: &User)
    -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Replace both name fields of an existing user.
    fn update_user(&self, user: &User)
    -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Delete a user together with all of their addresses, atomically.
    fn delete_user(&self, id: UserId) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Storage operations for addresses.
///
/// Writes and the per-user listing verify that the owning user exists and
/// report `RepositoryError::NotFound` for the user when it does not.
pub trait AddressRepository: Clone + Send + Sync + 'static {
    /// List every address. Returns an empty vector when there are none.
    fn list_addresses(&self)
    -> impl Future<Output = Result<Vec<Address>, RepositoryError>> + Send;

    /// Fetch a single address.
    fn get_address(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// List the addresses owned by a user.
    fn list_addresses_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Address>, RepositoryError>> + Send;

    /// Insert an address whose ID was generated by the caller.
    fn insert_address(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// Replace every field of an existing address.
    fn update_address(
        &self,
        address: &Address,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// Delete a single address.
    fn delete_address(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Build connection options from the database configuration.
///
/// # Errors
///
/// Returns `sqlx::Error::Configuration` if `url` is set but cannot be parsed.
pub fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    if let Some(url) = &config.url {
        return url.expose_secret().parse();
    }

    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(config.password.expose_secret())
        .database(&config.name))
}

/// Create a `PostgreSQL` connection pool and verify the store is reachable.
///
/// Pool bounds: 10 connections, 3 minute connection lifetime, 10 second
/// acquire timeout.
///
/// # Errors
///
/// Returns `sqlx::Error` if the options are invalid or the connection cannot
/// be established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(config)?;

    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .max_lifetime(Duration::from_secs(180))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
