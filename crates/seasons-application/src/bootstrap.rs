//! Composition root: builds the backends and use cases from configuration.

use std::sync::Arc;

use seasons_core::attachment::ObjectStore;
use seasons_core::card::CardRepository;
use seasons_core::config::SeasonsConfig;
use seasons_core::error::Result;
use seasons_core::identity::{IdentityProvider, Navigator};
use seasons_core::user::UserProfileRepository;
use seasons_infrastructure::telemetry::init_tracing;
use seasons_infrastructure::{
    ConfigService, FirebaseStorageObjectStore, FirestoreCardRepository, FirestoreClient,
    FirestoreUserProfileRepository, InMemoryCardRepository, InMemoryObjectStore,
    InMemoryUserProfileRepository,
};

use crate::account_service::AccountService;
use crate::composer::CardComposer;
use crate::gallery::GalleryViewModel;
use crate::identity_session::IdentitySession;
use crate::uploader::AttachmentUploader;

/// Which document and object backends were wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Firestore and Firebase Storage over REST.
    Hosted,
    /// Process-local stores; chosen when the backend settings are incomplete.
    InMemory,
}

struct Backends {
    kind: BackendKind,
    cards: Arc<dyn CardRepository>,
    profiles: Arc<dyn UserProfileRepository>,
    store: Arc<dyn ObjectStore>,
}

pub struct AppBootstrap {
    pub config: SeasonsConfig,
    pub backend: BackendKind,
    pub session: Arc<IdentitySession>,
    pub gallery: GalleryViewModel,
    pub composer: CardComposer,
    pub account: AccountService,
}

/// Loads configuration, installs logging and wires every use case.
///
/// The identity provider and navigator come from the embedding UI. The
/// session is started before returning, so this must run inside a tokio
/// runtime.
pub async fn bootstrap(
    config_service: &ConfigService,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
) -> Result<AppBootstrap> {
    let config = config_service.get_config()?;

    // A host (or an earlier bootstrap) may already own the global subscriber.
    if let Err(e) = init_tracing(&config.logging) {
        tracing::debug!("[Bootstrap] Keeping existing tracing setup: {}", e);
    }
    tracing::info!(
        "[Bootstrap] Loaded configuration from {}",
        config_service.path().display()
    );

    let backends = build_backends(&config, Arc::clone(&identity))?;
    tracing::info!("[Bootstrap] Using {:?} backends", backends.kind);

    let session = Arc::new(IdentitySession::new(identity, navigator));
    session.start();

    let gallery = GalleryViewModel::new(session.clone(), backends.cards.clone())
        .with_page_size(config.gallery.page_size);
    let composer = CardComposer::new(
        session.clone(),
        backends.cards.clone(),
        AttachmentUploader::new(backends.store.clone()),
    )
    .with_profiles(backends.profiles.clone());
    let account = AccountService::new(session.clone(), backends.profiles);

    Ok(AppBootstrap {
        config,
        backend: backends.kind,
        session,
        gallery,
        composer,
        account,
    })
}

fn build_backends(config: &SeasonsConfig, identity: Arc<dyn IdentityProvider>) -> Result<Backends> {
    if let Err(e) = config.backend.ensure_complete() {
        tracing::warn!("[Bootstrap] {}; falling back to in-memory backends", e);
        return Ok(Backends {
            kind: BackendKind::InMemory,
            cards: Arc::new(InMemoryCardRepository::new()),
            profiles: Arc::new(InMemoryUserProfileRepository::new()),
            store: Arc::new(InMemoryObjectStore::new()),
        });
    }

    let client = FirestoreClient::new(&config.backend)?.with_identity(identity.clone());
    let store = FirebaseStorageObjectStore::new(&config.backend)?.with_identity(identity);
    Ok(Backends {
        kind: BackendKind::Hosted,
        cards: Arc::new(FirestoreCardRepository::new(client.clone())),
        profiles: Arc::new(FirestoreUserProfileRepository::new(client)),
        store: Arc::new(store),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use seasons_core::identity::LandingView;
    use seasons_infrastructure::LocalIdentityProvider;
    use tempfile::TempDir;

    struct NoopNavigator;

    impl Navigator for NoopNavigator {
        fn navigate(&self, _view: LandingView) {}
    }

    fn config_service(dir: &TempDir, config: &SeasonsConfig) -> ConfigService {
        let service = ConfigService::with_path(dir.path().join("config.toml"));
        service.save(config).unwrap();
        service
    }

    #[tokio::test]
    async fn test_page_size_flows_into_gallery() {
        let dir = TempDir::new().unwrap();
        let mut config = SeasonsConfig::default();
        config.gallery.page_size = 3;
        let service = config_service(&dir, &config);

        let app = bootstrap(
            &service,
            Arc::new(LocalIdentityProvider::new()),
            Arc::new(NoopNavigator),
        )
        .await
        .unwrap();

        assert_eq!(app.gallery.page_size(), 3);
        assert_eq!(app.config.gallery.page_size, 3);
        assert!(app.session.is_running());
        app.session.shutdown();
    }

    #[tokio::test]
    async fn test_complete_backend_selects_hosted() {
        let dir = TempDir::new().unwrap();
        let mut config = SeasonsConfig::default();
        config.backend.project_id = "seasons-test".to_string();
        config.backend.api_key = "key".to_string();
        config.backend.storage_bucket = "seasons-test.appspot.com".to_string();
        let service = config_service(&dir, &config);

        let app = bootstrap(
            &service,
            Arc::new(LocalIdentityProvider::new()),
            Arc::new(NoopNavigator),
        )
        .await
        .unwrap();

        assert_eq!(app.backend, BackendKind::Hosted);
    }

    #[tokio::test]
    async fn test_blank_backend_falls_back_to_memory() {
        let config = SeasonsConfig::default();
        let backends =
            build_backends(&config, Arc::new(LocalIdentityProvider::new())).unwrap();
        assert_eq!(backends.kind, BackendKind::InMemory);
    }
}
