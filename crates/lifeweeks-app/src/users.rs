//! In-process user profile store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use lifeweeks_core::error::DomainError;
use lifeweeks_core::profile::UserProfile;
use lifeweeks_core::repository::UserProfileRepository;
use tracing::info;

use crate::error::AppError;

/// Profiles held in memory, keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    profiles: RwLock<HashMap<i64, UserProfile>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON array of profiles. A later entry replaces an earlier one
    /// with the same `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Serialization` if the document is not a profile
    /// array.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let profiles: Vec<UserProfile> = serde_json::from_str(json)?;
        let store = Self::new();
        for profile in profiles {
            store.upsert(profile);
        }
        Ok(store)
    }

    /// Reads and parses a JSON profile file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read and
    /// `AppError::Serialization` if it cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, AppError> {
        let json = tokio::fs::read_to_string(path).await?;
        let store = Self::from_json_str(&json)?;
        info!(path = %path.display(), users = store.len(), "loaded user profiles");
        Ok(store)
    }

    /// Inserts or replaces a profile. Returns `true` if it replaced one.
    pub fn upsert(&self, profile: UserProfile) -> bool {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile.user_id, profile)
            .is_some()
    }

    /// Removes a profile, returning it if present.
    pub fn remove(&self, user_id: i64) -> Option<UserProfile> {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id)
    }

    /// All stored user ids, ascending.
    #[must_use]
    pub fn user_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserStore {
    async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned())
    }
}
