//! End-to-end flows over the in-memory backends.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use seasons_application::{
    AttachmentUploader, CardComposer, ComposerPhase, GalleryViewModel, IdentitySession,
};
use seasons_core::Season;
use seasons_core::attachment::{AttachmentFile, MAX_ATTACHMENT_BYTES, ObjectStore, TransferProgress};
use seasons_core::card::{CardPage, CardRepository, NewCard, PageRequest};
use seasons_core::error::Result;
use seasons_core::identity::{Identity, LandingView, Navigator};
use seasons_infrastructure::{InMemoryCardRepository, InMemoryObjectStore, LocalIdentityProvider};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<LandingView>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, view: LandingView) {
        self.visits.lock().unwrap().push(view);
    }
}

#[derive(Default)]
struct CountingCards {
    inner: InMemoryCardRepository,
    creates: AtomicUsize,
}

#[async_trait]
impl CardRepository for CountingCards {
    async fn create(&self, card: NewCard) -> Result<String> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(card).await
    }

    async fn list_by_owner(&self, owner_id: &str, page: PageRequest) -> Result<CardPage> {
        self.inner.list_by_owner(owner_id, page).await
    }

    async fn update_season(&self, card_id: &str, season: Season) -> Result<()> {
        self.inner.update_season(card_id, season).await
    }
}

#[derive(Default)]
struct CountingStore {
    inner: InMemoryObjectStore,
    calls: AtomicUsize,
}

#[async_trait]
impl ObjectStore for CountingStore {
    async fn put_resumable(
        &self,
        path: &str,
        file: &AttachmentFile,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.put_resumable(path, file, progress).await
    }

    async fn public_url(&self, path: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.public_url(path).await
    }
}

struct App {
    session: Arc<IdentitySession>,
    cards: Arc<CountingCards>,
    store: Arc<CountingStore>,
    navigator: Arc<RecordingNavigator>,
}

impl App {
    fn signed_in(uid: &str) -> Self {
        let provider = Arc::new(
            LocalIdentityProvider::new()
                .with_restored_session(Identity::new(uid).with_display_name("Alice")),
        );
        let navigator = Arc::new(RecordingNavigator::default());
        let session = Arc::new(IdentitySession::new(provider, navigator.clone()));
        Self {
            session,
            cards: Arc::new(CountingCards::default()),
            store: Arc::new(CountingStore::default()),
            navigator,
        }
    }

    fn composer(&self) -> CardComposer {
        CardComposer::new(
            self.session.clone(),
            self.cards.clone(),
            AttachmentUploader::new(self.store.clone()),
        )
    }

    fn gallery(&self) -> GalleryViewModel {
        GalleryViewModel::new(self.session.clone(), self.cards.clone())
    }

    async fn post(&self, content: &str, season: Season) -> String {
        let mut composer = self.composer();
        composer.set_content(content);
        composer.set_season(season);
        composer.submit().await.unwrap()
    }
}

#[tokio::test]
async fn winter_filter_keeps_winter_cards_in_order() {
    let app = App::signed_in("u1");
    let first = app.post("first", Season::Winter).await;
    app.post("second", Season::Summer).await;
    let third = app.post("third", Season::Winter).await;

    let mut gallery = app.gallery();
    gallery.load().await.unwrap();
    gallery.toggle_filter(Season::Winter);

    let shown: Vec<&str> = gallery.cards().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(shown, vec![first.as_str(), third.as_str()]);
    assert_eq!(gallery.all_cards().len(), 3);
}

#[tokio::test]
async fn composer_without_attachment_skips_upload() {
    let app = App::signed_in("u1");
    let mut composer = app.composer();
    let mut phases = composer.subscribe();
    composer.set_content("Hello");
    composer.set_season(Season::Spring);

    let card_id = composer.submit().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(phase) = phases.try_recv() {
        seen.push(phase);
    }
    assert_eq!(
        seen,
        vec![
            ComposerPhase::Idle,
            ComposerPhase::Validating,
            ComposerPhase::Persisting,
            ComposerPhase::Done {
                card_id: card_id.clone()
            },
        ]
    );
    assert_eq!(app.cards.creates.load(Ordering::SeqCst), 1);
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);

    let card = app.cards.inner.find_by_id(&card_id).await.unwrap();
    assert_eq!(card.content, "Hello");
    assert_eq!(card.season, Season::Spring);
    assert_eq!(card.owner_id, "u1");
    assert_eq!(card.display_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn invalid_attachments_never_reach_the_store() {
    let app = App::signed_in("u1");
    let uploader = AttachmentUploader::new(app.store.clone());
    let oversized = AttachmentFile::new(
        "big.png",
        "image/png",
        vec![0u8; MAX_ATTACHMENT_BYTES as usize + 1],
    );
    let document = AttachmentFile::new("cv.pdf", "application/pdf", vec![0u8; 64]);

    assert!(uploader.upload(oversized, "u1").unwrap_err().is_validation());
    assert!(uploader.upload(document, "u1").unwrap_err().is_validation());
    assert_eq!(app.store.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn clear_filters_is_idempotent() {
    let app = App::signed_in("u1");
    app.post("a", Season::Autumn).await;
    app.post("b", Season::Spring).await;
    let mut gallery = app.gallery();
    gallery.load().await.unwrap();
    gallery.toggle_filter(Season::Autumn);

    gallery.clear_filters().await.unwrap();
    let once = gallery.cards().to_vec();
    gallery.clear_filters().await.unwrap();

    assert_eq!(gallery.cards(), once.as_slice());
    assert_eq!(once.len(), 2);
    assert!(gallery.active_filters().is_empty());
}

#[tokio::test]
async fn update_season_changes_only_the_season() {
    let app = App::signed_in("u1");
    let target = app.post("a", Season::Winter).await;
    app.post("b", Season::Summer).await;
    let mut gallery = app.gallery();
    gallery.load().await.unwrap();
    gallery.toggle_filter(Season::Winter);
    let before = gallery.all_cards().to_vec();

    gallery.update_season(&target, Season::Spring).await.unwrap();

    for (old, new) in before.iter().zip(gallery.all_cards()) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.content, new.content);
        if new.id == target {
            assert_eq!(new.season, Season::Spring);
        } else {
            assert_eq!(old.season, new.season);
        }
    }
    assert_eq!(gallery.cards()[0].season, Season::Spring);
    let stored = app.cards.inner.find_by_id(&target).await.unwrap();
    assert_eq!(stored.season, Season::Spring);
}

#[tokio::test]
async fn reorder_is_session_local() {
    let app = App::signed_in("u1");
    for (i, season) in [Season::Winter, Season::Summer, Season::Winter, Season::Autumn]
        .into_iter()
        .enumerate()
    {
        app.post(&format!("card {}", i), season).await;
    }
    let mut gallery = app.gallery();
    gallery.load().await.unwrap();
    let store_order: Vec<String> = gallery.all_cards().iter().map(|c| c.id.clone()).collect();

    gallery.reorder(3, 0).unwrap();
    let mut ids: Vec<String> = gallery.all_cards().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids[0], store_order[3]);
    ids.sort();
    let mut expected = store_order.clone();
    expected.sort();
    assert_eq!(ids, expected);

    gallery.refresh().await.unwrap();
    let refetched: Vec<String> = gallery.all_cards().iter().map(|c| c.id.clone()).collect();
    assert_eq!(refetched, store_order);
}

#[tokio::test]
async fn session_start_lands_on_gallery_once() {
    let app = App::signed_in("u1");
    let mut changes = app.session.subscribe();

    app.session.start();
    changes.changed().await.unwrap();
    assert_eq!(changes.borrow().as_ref().map(|i| i.uid.as_str()), Some("u1"));

    app.session.shutdown();
    assert_eq!(
        *app.navigator.visits.lock().unwrap(),
        vec![LandingView::Gallery]
    );
}
