//! Account page use cases: reading and saving the nickname.

use std::sync::Arc;

use seasons_core::error::Result;
use seasons_core::user::{UserProfile, UserProfileRepository, validate_nickname};

use crate::identity_session::IdentitySession;

pub struct AccountService {
    session: Arc<IdentitySession>,
    profiles: Arc<dyn UserProfileRepository>,
}

impl AccountService {
    pub fn new(session: Arc<IdentitySession>, profiles: Arc<dyn UserProfileRepository>) -> Self {
        Self { session, profiles }
    }

    /// Nickname of the signed-in user, if one was saved.
    pub async fn load_nickname(&self) -> Result<Option<String>> {
        let identity = self.session.require_user()?;
        let profile = self.profiles.find_by_id(&identity.uid).await?;
        Ok(profile.and_then(|p| p.nickname))
    }

    /// Saves the signed-in user's nickname and refreshes the mirrored
    /// identity fields. A blank nickname clears it.
    ///
    /// Invalid nicknames fail with `Validation` before anything is written.
    pub async fn save_nickname(&self, nickname: &str) -> Result<UserProfile> {
        let identity = self.session.require_user()?;
        let nickname = nickname.trim();
        let nickname = if nickname.is_empty() {
            None
        } else {
            validate_nickname(nickname)?;
            Some(nickname.to_string())
        };

        let profile = UserProfile::from_identity(&identity, nickname);
        self.profiles.upsert_merge(&profile).await?;
        tracing::info!("[AccountService] Saved profile of {}", identity.uid);
        Ok(profile)
    }
}
