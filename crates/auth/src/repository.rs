//! Identity store boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use marketplace_core::{RepositoryError, UserId};

use crate::User;

/// Durable collection of user accounts, looked up by username.
pub trait UserRepository: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Insert (assigning an id) or overwrite the account with the same username.
    fn save(&self, user: User) -> Result<User, RepositoryError>;
}

impl<S> UserRepository for Arc<S>
where
    S: UserRepository + ?Sized,
{
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        (**self).find_by_username(username)
    }

    fn save(&self, user: User) -> Result<User, RepositoryError> {
        (**self).save(user)
    }
}

/// In-memory identity store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicU64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let users = self
            .users
            .read()
            .map_err(|_| RepositoryError::lock_poisoned("users.find_by_username"))?;
        Ok(users.get(username).cloned())
    }

    fn save(&self, mut user: User) -> Result<User, RepositoryError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| RepositoryError::lock_poisoned("users.save"))?;

        if user.id.is_none() {
            user.id = match users.get(&user.username).and_then(|existing| existing.id) {
                Some(existing) => Some(existing),
                None => UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
            };
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}
