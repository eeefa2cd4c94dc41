//! In-memory `UserProfileRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use seasons_core::error::Result;
use seasons_core::user::{UserProfile, UserProfileRepository};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryUserProfileRepository {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryUserProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserProfileRepository {
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(uid).cloned())
    }

    async fn upsert_merge(&self, profile: &UserProfile) -> Result<()> {
        // A profile has no fields beyond the ones written, so merging
        // every written field is a plain replace.
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }
}
