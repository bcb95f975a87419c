//! User data port.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::profile::UserProfile;

/// Read access to user profiles, backed by whatever persistence layer the
/// host application uses.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Loads the current profile for `user_id`.
    ///
    /// Returns `Ok(None)` when no such user exists; absence is not an error.
    async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, DomainError>;
}
