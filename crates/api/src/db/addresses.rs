//! Address repository for database operations.
//!
//! Every write and the per-user listing check that the owning user exists.
//! Writes take a `FOR SHARE` lock on the user row inside the same
//! transaction. A user delete holds `FOR UPDATE` on that row, so the two
//! serialize: the write either commits first and is removed by the delete,
//! or runs after it and reports the user as missing.

use sqlx::{PgConnection, PgPool};

use addressbook_core::{AddressId, UserId};

use super::{AddressRepository, RepositoryError};
use crate::models::Address;

/// `PostgreSQL`-backed address repository.
#[derive(Debug, Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    /// Create a new address repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Fail with `NotFound` for the user unless a row with this ID exists.
async fn lock_owner(conn: &mut PgConnection, user_id: UserId) -> Result<(), RepositoryError> {
    let owner: Option<UserId> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR SHARE")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

    owner
        .map(|_| ())
        .ok_or_else(|| RepositoryError::user_not_found(user_id))
}

impl AddressRepository for PgAddressRepository {
    /// List all addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, street, city, state, zip, "type"
            FROM addresses
            ORDER BY user_id, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses)
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no address has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    async fn get_address(&self, id: AddressId) -> Result<Address, RepositoryError> {
        sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, street, city, state, zip, "type"
            FROM addresses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::address_not_found(id))
    }

    /// List the addresses owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for the user if they do not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    async fn list_addresses_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        if !exists {
            return Err(RepositoryError::user_not_found(user_id));
        }

        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, user_id, street, city, state, zip, "type"
            FROM addresses
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(addresses)
    }

    /// Insert a new address for an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for the user if the owner does not exist.
    /// Returns `RepositoryError::UnexpectedRowCount` unless exactly one row was written.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn insert_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_owner(&mut *tx, address.user_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO addresses (id, user_id, street, city, state, zip, "type")
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(&address.kind)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(RepositoryError::UnexpectedRowCount(result.rows_affected()));
        }

        tx.commit().await?;

        tracing::debug!(address_id = %address.id, user_id = %address.user_id, "Inserted address");
        Ok(address.clone())
    }

    /// Replace every field of an address.
    ///
    /// The owner is checked first, so a missing user is reported even when
    /// the address is missing too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for the user if the owner does not exist,
    /// or for the address if no address has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn update_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        lock_owner(&mut *tx, address.user_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE addresses
            SET user_id = $1, street = $2, city = $3, state = $4, zip = $5, "type" = $6
            WHERE id = $7
            "#,
        )
        .bind(address.user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(&address.kind)
        .bind(address.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::address_not_found(address.id));
        }

        tx.commit().await?;
        Ok(address.clone())
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no address has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    async fn delete_address(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::address_not_found(id));
        }

        Ok(())
    }
}
