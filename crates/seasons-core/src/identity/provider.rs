//! Identity provider and navigation seams.

use async_trait::async_trait;
use tokio::sync::watch;

use super::model::{AuthScope, Identity, LandingView};
use crate::error::Result;

/// Wraps an OAuth-capable identity service.
///
/// Implementations publish every session change (including the state
/// restored at startup) on the channel returned by [`watch`](Self::watch).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The identity of the signed-in user, if any.
    fn current_user(&self) -> Option<Identity>;

    /// Subscribes to session changes. The receiver starts at the current state.
    fn watch(&self) -> watch::Receiver<Option<Identity>>;

    /// Runs interactive sign-in requesting `scopes`.
    ///
    /// # Errors
    ///
    /// `Auth` when the user cancels or the provider rejects the attempt.
    async fn sign_in(&self, scopes: &[AuthScope]) -> Result<Identity>;

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// `Auth` when the provider fails to revoke the session.
    async fn sign_out(&self) -> Result<()>;

    /// Bearer token for authenticated backend calls.
    ///
    /// Providers without tokens (local and test backends) keep the default.
    async fn id_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Receives landing-view redirects from the identity session.
pub trait Navigator: Send + Sync {
    fn navigate(&self, view: LandingView);
}
