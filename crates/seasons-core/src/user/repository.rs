//! User profile repository trait.

use async_trait::async_trait;

use super::model::UserProfile;
use crate::error::Result;

/// Repository for the `users` collection, keyed by provider uid.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// Loads the profile for `uid`; `Ok(None)` when none was ever saved.
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>>;

    /// Upserts `profile`, merging its fields into any existing document.
    async fn upsert_merge(&self, profile: &UserProfile) -> Result<()>;
}
