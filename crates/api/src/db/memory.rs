//! In-memory repository used by handler and CLI tests.
//!
//! Compiled for this crate's tests and for dependents that enable the
//! `test-util` feature.
//!
//! Mirrors the `PostgreSQL` repositories: the same ordering, the same owner
//! checks and the same not-found reporting. `fail_all` makes every
//! operation return a database error.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use addressbook_core::{AddressId, UserId};

use super::{AddressRepository, RepositoryError, UserRepository};
use crate::models::{Address, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    addresses: Vec<Address>,
    fail: bool,
}

/// Shared in-memory store implementing both repository traits.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryRepository {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the tables, or fail if failure injection is on.
    fn open(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        let tables = self.lock();
        if tables.fail {
            return Err(RepositoryError::Database(sqlx::Error::PoolClosed));
        }
        Ok(tables)
    }

    pub fn fail_all(&self) {
        self.lock().fail = true;
    }

    pub fn seed_user(&self, user: User) {
        self.lock().users.push(user);
    }

    pub fn seed_address(&self, address: Address) {
        self.lock().addresses.push(address);
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    #[must_use]
    pub fn address_count(&self) -> usize {
        self.lock().addresses.len()
    }
}

impl Tables {
    fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

impl UserRepository for MemoryRepository {
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users = self.open()?.users.clone();
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id.as_uuid())
                .cmp(&(&b.last_name, &b.first_name, b.id.as_uuid()))
        });
        Ok(users)
    }

    async fn get_user(&self, id: UserId) -> Result<User, RepositoryError> {
        self.open()?
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::user_not_found(id))
    }

    async fn insert_user(&self, user: &User) -> Result<User, RepositoryError> {
        self.open()?.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User, RepositoryError> {
        let mut tables = self.open()?;
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| RepositoryError::user_not_found(user.id))?;
        stored.clone_from(user);
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut tables = self.open()?;
        if !tables.has_user(id) {
            return Err(RepositoryError::user_not_found(id));
        }
        tables.addresses.retain(|a| a.user_id != id);
        tables.users.retain(|u| u.id != id);
        Ok(())
    }
}

impl AddressRepository for MemoryRepository {
    async fn list_addresses(&self) -> Result<Vec<Address>, RepositoryError> {
        let mut addresses = self.open()?.addresses.clone();
        addresses.sort_by_key(|a| (a.user_id.as_uuid(), a.id.as_uuid()));
        Ok(addresses)
    }

    async fn get_address(&self, id: AddressId) -> Result<Address, RepositoryError> {
        self.open()?
            .addresses
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::address_not_found(id))
    }

    async fn list_addresses_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let tables = self.open()?;
        if !tables.has_user(user_id) {
            return Err(RepositoryError::user_not_found(user_id));
        }
        let mut addresses: Vec<Address> = tables
            .addresses
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        addresses.sort_by_key(|a| a.id.as_uuid());
        Ok(addresses)
    }

    async fn insert_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let mut tables = self.open()?;
        if !tables.has_user(address.user_id) {
            return Err(RepositoryError::user_not_found(address.user_id));
        }
        tables.addresses.push(address.clone());
        Ok(address.clone())
    }

    async fn update_address(&self, address: &Address) -> Result<Address, RepositoryError> {
        let mut tables = self.open()?;
        if !tables.has_user(address.user_id) {
            return Err(RepositoryError::user_not_found(address.user_id));
        }
        let stored = tables
            .addresses
            .iter_mut()
            .find(|a| a.id == address.id)
            .ok_or_else(|| RepositoryError::address_not_found(address.id))?;
        stored.clone_from(address);
        Ok(address.clone())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), RepositoryError> {
        let mut tables = self.open()?;
        let before = tables.addresses.len();
        tables.addresses.retain(|a| a.id != id);
        if tables.addresses.len() == before {
            return Err(RepositoryError::address_not_found(id));
        }
        Ok(())
    }
}
