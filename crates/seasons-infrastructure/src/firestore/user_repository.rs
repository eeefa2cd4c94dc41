//! Firestore-backed `UserProfileRepository`.

use async_trait::async_trait;

use seasons_core::error::Result;
use seasons_core::user::{USERS_COLLECTION, UserProfile, UserProfileRepository};

use super::client::FirestoreClient;
use super::document::{PROFILE_FIELDS, decode_profile, encode_profile};

/// Profiles stored as `users/<uid>`.
#[derive(Clone)]
pub struct FirestoreUserProfileRepository {
    client: FirestoreClient,
}

impl FirestoreUserProfileRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserProfileRepository for FirestoreUserProfileRepository {
    async fn find_by_id(&self, uid: &str) -> Result<Option<UserProfile>> {
        let document = self.client.get_document(USERS_COLLECTION, uid).await?;
        Ok(document.as_ref().map(decode_profile))
    }

    async fn upsert_merge(&self, profile: &UserProfile) -> Result<()> {
        // The update mask limits the write to these fields, leaving any
        // others on the document untouched; the document is created if absent.
        self.client
            .patch_document(
                USERS_COLLECTION,
                &profile.id,
                encode_profile(profile),
                &PROFILE_FIELDS,
                false,
            )
            .await
    }
}
