//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::{AddressRepository, UserRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers access to
/// the user and address repositories. It is generic over the repository
/// implementations so tests can swap in an in-memory store.
pub struct AppState<U, A> {
    inner: Arc<AppStateInner<U, A>>,
}

struct AppStateInner<U, A> {
    users: U,
    addresses: A,
}

impl<U, A> Clone for AppState<U, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<U: UserRepository, A: AddressRepository> AppState<U, A> {
    /// Create a new application state.
    #[must_use]
    pub fn new(users: U, addresses: A) -> Self {
        Self {
            inner: Arc::new(AppStateInner { users, addresses }),
        }
    }

    /// Get a reference to the user repository.
    #[must_use]
    pub fn users(&self) -> &U {
        &self.inner.users
    }

    /// Get a reference to the address repository.
    #[must_use]
    pub fn addresses(&self) -> &A {
        &self.inner.addresses
    }
}
