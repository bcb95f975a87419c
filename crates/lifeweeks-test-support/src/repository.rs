//! Test repositories — mock `UserProfileRepository` implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::profile::UserProfile;
use lifeweeks_core::repository::UserProfileRepository;

/// A user repository backed by a map. Records every looked-up user id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<i64, UserProfile>>,
    lookups: Mutex<Vec<i64>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `profiles`.
    #[must_use]
    pub fn with_users(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let repo = Self::new();
        for profile in profiles {
            repo.insert(profile);
        }
        repo
    }

    /// Inserts or replaces a profile.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn insert(&self, profile: UserProfile) {
        self.users.lock().unwrap().insert(profile.user_id, profile);
    }

    /// Removes a profile.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn remove(&self, user_id: i64) {
        self.users.lock().unwrap().remove(&user_id);
    }

    /// Returns every user id passed to `get_user_profile`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn lookups(&self) -> Vec<i64> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserRepository {
    async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, DomainError> {
        self.lookups.lock().unwrap().push(user_id);
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

/// A user repository that always returns an infrastructure error. Useful for
/// testing error-containment paths.
#[derive(Debug)]
pub struct FailingUserRepository;

#[async_trait]
impl UserProfileRepository for FailingUserRepository {
    async fn get_user_profile(&self, _user_id: i64) -> Result<Option<UserProfile>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
