//! Identity session: the app-wide view of who is signed in.
//!
//! Constructed explicitly and handed to the components that need the
//! current user. `start` subscribes to the provider; `shutdown` tears the
//! subscription down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use seasons_core::error::{Result, SeasonsError};
use seasons_core::identity::{AuthScope, Identity, IdentityProvider, LandingView, Navigator};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// State shared with the listener task.
struct SessionShared {
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Option<Identity>>,
    /// Set once the first provider state has been reacted to, or once an
    /// explicit sign-in/out has navigated. Cleared by `shutdown`.
    first_state_handled: AtomicBool,
}

impl SessionShared {
    fn observe(&self, identity: Option<Identity>) {
        tracing::info!(
            "[IdentitySession] Session changed: {}",
            identity
                .as_ref()
                .map(|i| i.uid.as_str())
                .unwrap_or("<signed out>")
        );
        if !self.first_state_handled.swap(true, Ordering::SeqCst) {
            let landing = LandingView::for_session(identity.as_ref());
            tracing::debug!("[IdentitySession] Initial redirect to {}", landing);
            self.navigator.navigate(landing);
        }
        self.state.send_replace(identity);
    }
}

pub struct IdentitySession {
    provider: Arc<dyn IdentityProvider>,
    shared: Arc<SessionShared>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl IdentitySession {
    pub fn new(provider: Arc<dyn IdentityProvider>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(provider.current_user());
        Self {
            provider,
            shared: Arc::new(SessionShared {
                navigator,
                state,
                first_state_handled: AtomicBool::new(false),
            }),
            listener: Mutex::new(None),
        }
    }

    /// Starts listening to provider session changes.
    ///
    /// The provider's current state is observed immediately and triggers the
    /// initial redirect, unless an explicit `sign_in` or `sign_out` has
    /// already navigated. Calling `start` while running does nothing; calling
    /// it after `shutdown` begins a fresh session and redirects again.
    ///
    /// Spawns the listener with `tokio::spawn`, so it must be called within
    /// a tokio runtime.
    pub fn start(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        if listener.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let mut changes = self.provider.watch();

        *listener = Some(tokio::spawn(async move {
            loop {
                let identity = changes.borrow_and_update().clone();
                shared.observe(identity);
                if changes.changed().await.is_err() {
                    tracing::debug!("[IdentitySession] Provider closed its session channel");
                    break;
                }
            }
        }));
    }

    /// Stops listening. Subscribers keep the last observed state.
    pub fn shutdown(&self) {
        let mut listener = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = listener.take() {
            handle.abort();
            self.shared.first_state_handled.store(false, Ordering::SeqCst);
            tracing::debug!("[IdentitySession] Listener stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.provider.current_user()
    }

    /// The signed-in identity, or `Auth` when nobody is signed in.
    pub fn require_user(&self) -> Result<Identity> {
        self.current_user()
            .ok_or_else(|| SeasonsError::auth("You must be signed in"))
    }

    /// Subscribes to session changes as seen by this session.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.shared.state.subscribe()
    }

    /// Runs interactive sign-in with the `email` and `profile` scopes and
    /// lands on the gallery.
    pub async fn sign_in(&self) -> Result<Identity> {
        tracing::debug!("[IdentitySession] Starting sign in");
        match self.provider.sign_in(&AuthScope::SIGN_IN).await {
            Ok(identity) => {
                tracing::info!("[IdentitySession] Signed in {}", identity.uid);
                self.navigate_explicitly(LandingView::Gallery);
                Ok(identity)
            }
            Err(e) => {
                tracing::error!("[IdentitySession] Sign in failed: {}", e);
                Err(into_auth_error(e))
            }
        }
    }

    /// Signs out and lands on the login view.
    pub async fn sign_out(&self) -> Result<()> {
        match self.provider.sign_out().await {
            Ok(()) => {
                tracing::info!("[IdentitySession] Signed out");
                self.navigate_explicitly(LandingView::Login);
                Ok(())
            }
            Err(e) => {
                tracing::error!("[IdentitySession] Sign out failed: {}", e);
                Err(into_auth_error(e))
            }
        }
    }
}

impl IdentitySession {
    /// Navigates on behalf of a user action. Counts as the initial redirect
    /// so the listener does not repeat it.
    fn navigate_explicitly(&self, view: LandingView) {
        self.shared.first_state_handled.store(true, Ordering::SeqCst);
        self.shared.navigator.navigate(view);
    }
}

impl Drop for IdentitySession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn into_auth_error(err: SeasonsError) -> SeasonsError {
    match err {
        SeasonsError::Auth(_) => err,
        other => SeasonsError::auth(other.to_string()),
    }
}
