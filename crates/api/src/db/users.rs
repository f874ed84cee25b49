//! User repository for database operations.
//!
//! Deleting a user runs inside a transaction that locks the user row
//! `FOR UPDATE`, removes the user's addresses, then removes the user. Address
//! writes hold `FOR SHARE` on the same row, so they either finish before the
//! delete (and their rows are removed with it) or wait and then find the user
//! gone.

use sqlx::PgPool;

use addressbook_core::UserId;

use super::{RepositoryError, UserRepository};
use crate::models::User;

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    /// List all users ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, firstname, lastname
            FROM users
            ORDER BY lastname, firstname, id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    async fn get_user(&self, id: UserId) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            SELECT id, firstname, lastname
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UnexpectedRowCount` unless exactly one row was written.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn insert_user(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (id, firstname, lastname)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() != 1 {
            return Err(RepositoryError::UnexpectedRowCount(result.rows_affected()));
        }

        tracing::debug!(user_id = %user.id, "Inserted user");
        Ok(user.clone())
    }

    /// Replace a user's names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET firstname = $1, lastname = $2
            WHERE id = $3
            ",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::user_not_found(user.id));
        }

        Ok(user.clone())
    }

    /// Delete a user and every address they own.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID; nothing is deleted.
    /// Returns `RepositoryError::UnexpectedRowCount` if the locked row was not deleted.
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back.
    async fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // An early return via `?` drops `tx`, which rolls it back.
        let locked: Option<UserId> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Err(RepositoryError::user_not_found(id));
        }

        let addresses = sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let users = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if users.rows_affected() != 1 {
            tx.rollback().await?;
            return Err(RepositoryError::UnexpectedRowCount(users.rows_affected()));
        }

        tx.commit().await?;

        tracing::debug!(
            user_id = %id,
            addresses_deleted = addresses.rows_affected(),
            "Deleted user"
        );
        Ok(())
    }
}
