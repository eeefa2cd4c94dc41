//! Local identity provider.

use std::sync::Mutex;

use async_trait::async_trait;
use seasons_core::error::{Result, SeasonsError};
use seasons_core::identity::{AuthScope, Identity, IdentityProvider};
use tokio::sync::watch;

/// Identity provider that signs in a preconfigured account.
///
/// Stands in for the interactive consent flow: `sign_in` succeeds with the
/// configured account, or fails with `Auth` when none is configured (the
/// equivalent of the user dismissing the consent prompt).
#[derive(Debug)]
pub struct LocalIdentityProvider {
    session: watch::Sender<Option<Identity>>,
    account: Mutex<Option<Identity>>,
}

impl LocalIdentityProvider {
    /// A provider with no restored session and no account to sign in.
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            session,
            account: Mutex::new(None),
        }
    }

    /// Sets the account returned by the next `sign_in`.
    pub fn with_account(self, identity: Identity) -> Self {
        self.set_account(Some(identity));
        self
    }

    /// Starts with `identity` already signed in (a persisted session).
    pub fn with_restored_session(self, identity: Identity) -> Self {
        self.session.send_replace(Some(identity));
        self
    }

    pub fn set_account(&self, identity: Option<Identity>) {
        let mut account = self.account.lock().unwrap_or_else(|e| e.into_inner());
        *account = identity;
    }

    /// Pushes a session change as if it came from the provider itself,
    /// e.g. a token expiring in the background.
    pub fn emit(&self, identity: Option<Identity>) {
        self.session.send_replace(identity);
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    fn current_user(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.session.subscribe()
    }

    async fn sign_in(&self, scopes: &[AuthScope]) -> Result<Identity> {
        let account = self
            .account
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| SeasonsError::auth("sign-in was cancelled"))?;

        tracing::debug!(
            "[LocalIdentityProvider] Signing in {} with scopes {:?}",
            account.uid,
            scopes
        );
        self.session.send_replace(Some(account.clone()));
        Ok(account)
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_without_account_fails() {
        let provider = LocalIdentityProvider::new();
        let err = provider.sign_in(&AuthScope::SIGN_IN).await.unwrap_err();
        assert!(err.is_auth());
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_and_out_publish_changes() {
        let provider = LocalIdentityProvider::new().with_account(Identity::new("uid-1"));
        let mut rx = provider.watch();

        provider.sign_in(&AuthScope::SIGN_IN).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().map(|i| i.uid.as_str()), Some("uid-1"));

        provider.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
    }

    #[test]
    fn test_restored_session_is_current() {
        let provider = LocalIdentityProvider::new().with_restored_session(Identity::new("uid-9"));
        assert_eq!(provider.current_user().unwrap().uid, "uid-9");
    }
}
