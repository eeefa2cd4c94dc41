use std::collections::BTreeSet;
use std::sync::Arc;

use seasons_core::Season;
use seasons_core::card::{Card, CardPage, CardRepository, DEFAULT_PAGE_SIZE, PageCursor, PageRequest};
use seasons_core::error::{Result, SeasonsError};

use super::view::{derive_view, reorder_cards};
use crate::identity_session::IdentitySession;

/// A page fetch that has been issued but not yet applied.
///
/// Produced by [`GalleryViewModel::begin_fetch`]. Running it does not touch
/// the view-model, so several requests may be in flight at once; only the
/// most recently issued one is accepted by [`GalleryViewModel::apply`].
#[derive(Debug, Clone)]
pub struct FetchRequest {
    epoch: u64,
    page: usize,
    owner_id: String,
    request: PageRequest,
}

impl FetchRequest {
    pub fn page(&self) -> usize {
        self.page
    }

    pub async fn run(self, cards: &dyn CardRepository) -> FetchOutcome {
        tracing::debug!(
            "[Gallery] Fetching page {} for {} (epoch {})",
            self.page,
            self.owner_id,
            self.epoch
        );
        let result = cards.list_by_owner(&self.owner_id, self.request).await;
        FetchOutcome {
            epoch: self.epoch,
            page: self.page,
            result,
        }
    }
}

/// Result of a [`FetchRequest`], tagged with the request that produced it.
#[derive(Debug)]
pub struct FetchOutcome {
    epoch: u64,
    page: usize,
    result: Result<CardPage>,
}

/// Presentation state of the card gallery.
///
/// Holds one page of the user's cards (`all_cards`), the active season
/// filters and the derived view shown to the user. Reordering is
/// session-local: it is never persisted and the next fetch restores the
/// store order.
pub struct GalleryViewModel {
    session: Arc<IdentitySession>,
    cards: Arc<dyn CardRepository>,
    page_size: usize,
    all_cards: Vec<Card>,
    active_filters: BTreeSet<Season>,
    view: Vec<Card>,
    current_page: usize,
    /// Cursor starting each reachable page; index 0 is page 1.
    page_cursors: Vec<Option<PageCursor>>,
    loading: bool,
    error: Option<String>,
    latest_epoch: u64,
}

impl GalleryViewModel {
    pub fn new(session: Arc<IdentitySession>, cards: Arc<dyn CardRepository>) -> Self {
        Self {
            session,
            cards,
            page_size: DEFAULT_PAGE_SIZE,
            all_cards: Vec::new(),
            active_filters: BTreeSet::new(),
            view: Vec::new(),
            current_page: 1,
            page_cursors: vec![None],
            loading: false,
            error: None,
            latest_epoch: 0,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Issues a fetch for `page` and marks the gallery as loading.
    ///
    /// Fails with `Validation` when no cursor for `page` is known yet and
    /// with `Auth` when nobody is signed in.
    pub fn begin_fetch(&mut self, page: usize) -> Result<FetchRequest> {
        let cursor = self.cursor_for(page)?;
        let owner = self.session.require_user()?;

        self.latest_epoch += 1;
        self.loading = true;

        let request = match cursor {
            Some(cursor) => PageRequest::after(self.page_size, cursor),
            None => PageRequest::first(self.page_size),
        };
        Ok(FetchRequest {
            epoch: self.latest_epoch,
            page,
            owner_id: owner.uid,
            request,
        })
    }

    /// Applies a finished fetch. Returns `false` when the outcome was
    /// superseded by a newer request and discarded.
    pub fn apply(&mut self, outcome: FetchOutcome) -> bool {
        if outcome.epoch != self.latest_epoch {
            tracing::debug!(
                "[Gallery] Discarding stale result for page {} (epoch {}, latest {})",
                outcome.page,
                outcome.epoch,
                self.latest_epoch
            );
            return false;
        }

        self.loading = false;
        match outcome.result {
            Ok(page) => {
                tracing::info!(
                    "[Gallery] Loaded {} cards on page {}",
                    page.cards.len(),
                    outcome.page
                );
                // Later pages stay reachable while the boundary is unchanged.
                match page.next_cursor {
                    Some(next) if self.known_cursor(outcome.page + 1) == Some(&next) => {}
                    Some(next) => {
                        self.page_cursors.truncate(outcome.page);
                        self.page_cursors.push(Some(next));
                    }
                    None => self.page_cursors.truncate(outcome.page),
                }
                self.all_cards = page.cards;
                self.current_page = outcome.page;
                self.error = None;
                self.recompute_view();
            }
            Err(e) => {
                tracing::error!("[Gallery] Failed to load page {}: {}", outcome.page, e);
                self.error = Some(e.user_message());
            }
        }
        true
    }

    /// Fetches the first page.
    pub async fn load(&mut self) -> Result<()> {
        self.fetch_page(1).await
    }

    /// Refetches the current page.
    pub async fn refresh(&mut self) -> Result<()> {
        self.fetch_page(self.current_page).await
    }

    /// Moves to page `page` (1-based).
    ///
    /// Already visited pages and the page right after the last one
    /// fetched are reachable; anything else is a `Validation` error.
    pub async fn change_page(&mut self, page: usize) -> Result<()> {
        self.fetch_page(page).await
    }

    async fn fetch_page(&mut self, page: usize) -> Result<()> {
        let request = match self.begin_fetch(page) {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };
        let cards = Arc::clone(&self.cards);
        let outcome = request.run(cards.as_ref()).await;
        let failure = outcome.result.as_ref().err().cloned();
        self.apply(outcome);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn known_cursor(&self, page: usize) -> Option<&PageCursor> {
        self.page_cursors.get(page - 1).and_then(Option::as_ref)
    }

    fn cursor_for(&self, page: usize) -> Result<Option<PageCursor>> {
        if page == 0 || page > self.page_cursors.len() {
            return Err(SeasonsError::validation(format!(
                "Page {} is not available (1 to {})",
                page,
                self.page_cursors.len()
            )));
        }
        Ok(self.page_cursors[page - 1].clone())
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    /// Adds `season` to the active filters, or removes it if present.
    pub fn toggle_filter(&mut self, season: Season) {
        if !self.active_filters.remove(&season) {
            self.active_filters.insert(season);
        }
        tracing::debug!("[Gallery] Active filters: {:?}", self.active_filters);
        self.recompute_view();
    }

    /// Clears every filter and goes back to page 1.
    pub async fn clear_filters(&mut self) -> Result<()> {
        self.active_filters.clear();
        self.recompute_view();
        if self.current_page != 1 {
            self.fetch_page(1).await?;
        }
        Ok(())
    }

    fn recompute_view(&mut self) {
        self.view = derive_view(&self.all_cards, &self.active_filters);
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Moves the card at `from` to `to` in the shown view.
    ///
    /// Session-local only; nothing is written to the store.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        reorder_cards(&mut self.view, &mut self.all_cards, from, to)
    }

    /// Changes a card's season in the store, then in place locally.
    ///
    /// The card keeps its position in the shown view even if it no longer
    /// matches the active filters.
    pub async fn update_season(&mut self, card_id: &str, season: Season) -> Result<()> {
        tracing::debug!("[Gallery] Updating season of {} to {}", card_id, season);
        if let Err(e) = self.cards.update_season(card_id, season).await {
            tracing::error!("[Gallery] Failed to update {}: {}", card_id, e);
            self.error = Some(e.user_message());
            return Err(e);
        }

        for card in self
            .all_cards
            .iter_mut()
            .chain(self.view.iter_mut())
            .filter(|card| card.id == card_id)
        {
            card.season = season;
        }
        tracing::info!("[Gallery] Card {} is now {}", card_id, season);
        Ok(())
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Cards shown to the user: the filtered, possibly reordered page.
    pub fn cards(&self) -> &[Card] {
        &self.view
    }

    pub fn all_cards(&self) -> &[Card] {
        &self.all_cards
    }

    pub fn active_filters(&self) -> &BTreeSet<Season> {
        &self.active_filters
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Pages visited so far, plus one when more cards are known to exist.
    pub fn total_pages(&self) -> usize {
        self.page_cursors.len()
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.page_cursors.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seasons_core::card::NewCard;
    use seasons_core::identity::{Identity, LandingView, Navigator};
    use seasons_infrastructure::{InMemoryCardRepository, LocalIdentityProvider};

    struct NoopNavigator;

    impl Navigator for NoopNavigator {
        fn navigate(&self, _view: LandingView) {}
    }

    struct FailingRepository;

    #[async_trait]
    impl CardRepository for FailingRepository {
        async fn create(&self, _card: NewCard) -> Result<String> {
            Err(SeasonsError::write("offline"))
        }

        async fn list_by_owner(&self, _owner_id: &str, _page: PageRequest) -> Result<CardPage> {
            Err(SeasonsError::query("offline"))
        }

        async fn update_season(&self, _card_id: &str, _season: Season) -> Result<()> {
            Err(SeasonsError::write("offline"))
        }
    }

    fn signed_in_session() -> Arc<IdentitySession> {
        let provider =
            Arc::new(LocalIdentityProvider::new().with_restored_session(Identity::new("u1")));
        Arc::new(IdentitySession::new(provider, Arc::new(NoopNavigator)))
    }

    async fn seeded(seasons: &[Season]) -> Arc<InMemoryCardRepository> {
        let repo = Arc::new(InMemoryCardRepository::new());
        for (i, season) in seasons.iter().enumerate() {
            repo.create(NewCard {
                content: format!("card {}", i),
                owner_id: "u1".to_string(),
                season: *season,
                display_name: None,
                nickname: None,
                attachment: None,
            })
            .await
            .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_load_requires_sign_in() {
        let provider = Arc::new(LocalIdentityProvider::new());
        let session = Arc::new(IdentitySession::new(provider, Arc::new(NoopNavigator)));
        let mut gallery = GalleryViewModel::new(session, Arc::new(InMemoryCardRepository::new()));

        assert!(gallery.load().await.unwrap_err().is_auth());
        assert!(gallery.error().is_some());
    }

    #[tokio::test]
    async fn test_pages_follow_cursors() {
        let repo = seeded(&[Season::Winter; 5]).await;
        let mut gallery = GalleryViewModel::new(signed_in_session(), repo).with_page_size(2);

        gallery.load().await.unwrap();
        assert_eq!(gallery.cards().len(), 2);
        assert_eq!(gallery.total_pages(), 2);

        // Page 3 is unknown until page 2 has been fetched.
        assert!(gallery.change_page(3).await.unwrap_err().is_validation());

        gallery.change_page(2).await.unwrap();
        gallery.change_page(3).await.unwrap();
        assert_eq!(gallery.current_page(), 3);
        assert_eq!(gallery.cards().len(), 1);
        assert_eq!(gallery.total_pages(), 3);
        assert!(!gallery.has_next_page());

        gallery.change_page(1).await.unwrap();
        assert_eq!(gallery.cards()[0].content, "card 0");
        assert_eq!(gallery.total_pages(), 3);
        assert!(gallery.change_page(0).await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let repo = seeded(&[Season::Winter, Season::Summer, Season::Autumn]).await;
        let mut gallery =
            GalleryViewModel::new(signed_in_session(), repo.clone()).with_page_size(1);
        gallery.load().await.unwrap();

        let first = gallery.begin_fetch(1).unwrap();
        let second = gallery.begin_fetch(2).unwrap();
        let second_outcome = second.run(repo.as_ref()).await;
        let first_outcome = first.run(repo.as_ref()).await;

        assert!(gallery.apply(second_outcome));
        assert!(!gallery.apply(first_outcome));
        assert_eq!(gallery.current_page(), 2);
        assert_eq!(gallery.cards()[0].season, Season::Summer);
        assert!(!gallery.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_cards() {
        let repo = seeded(&[Season::Winter]).await;
        let mut gallery = GalleryViewModel::new(signed_in_session(), repo);
        gallery.load().await.unwrap();
        let before = gallery.all_cards().to_vec();

        let outcome = gallery
            .begin_fetch(1)
            .unwrap()
            .run(&FailingRepository)
            .await;
        assert!(gallery.apply(outcome));

        assert_eq!(gallery.all_cards(), before.as_slice());
        assert_eq!(gallery.error(), Some("Could not load your cards"));
        gallery.dismiss_error();
        assert!(gallery.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_season_update_sets_error() {
        let mut gallery =
            GalleryViewModel::new(signed_in_session(), Arc::new(FailingRepository));

        let err = gallery.update_season("missing", Season::Autumn).await.unwrap_err();

        assert!(err.is_write());
        assert_eq!(gallery.error(), Some("Could not save your changes"));
    }

    #[tokio::test]
    async fn test_filter_sequence_matches_active_set() {
        let repo = seeded(&[
            Season::Winter,
            Season::Summer,
            Season::Autumn,
            Season::Winter,
            Season::Spring,
        ])
        .await;
        let mut gallery = GalleryViewModel::new(signed_in_session(), repo);
        gallery.load().await.unwrap();

        let steps = [
            (Season::Winter, vec![Season::Winter]),
            (Season::Summer, vec![Season::Summer, Season::Winter]),
            (Season::Winter, vec![Season::Summer]),
            (Season::Autumn, vec![Season::Summer, Season::Autumn]),
            (Season::Summer, vec![Season::Autumn]),
            (Season::Autumn, vec![]),
        ];
        for (season, expected) in steps {
            gallery.toggle_filter(season);

            let active: Vec<Season> = gallery.active_filters().iter().copied().collect();
            let mut expected = expected;
            expected.sort();
            assert_eq!(active, expected);

            let filtered: Vec<Card> = if active.is_empty() {
                gallery.all_cards().to_vec()
            } else {
                gallery
                    .all_cards()
                    .iter()
                    .filter(|card| active.contains(&card.season))
                    .cloned()
                    .collect()
            };
            assert_eq!(gallery.cards(), filtered.as_slice());
        }

        assert_eq!(gallery.cards(), gallery.all_cards());
        assert_eq!(gallery.cards().len(), 5);
    }

    #[tokio::test]
    async fn test_clear_filters_returns_to_first_page() {
        let repo = seeded(&[Season::Winter, Season::Summer, Season::Winter]).await;
        let mut gallery = GalleryViewModel::new(signed_in_session(), repo).with_page_size(2);
        gallery.load().await.unwrap();
        gallery.change_page(2).await.unwrap();
        gallery.toggle_filter(Season::Summer);
        assert!(gallery.cards().is_empty());

        gallery.clear_filters().await.unwrap();

        assert_eq!(gallery.current_page(), 1);
        assert!(gallery.active_filters().is_empty());
        assert_eq!(gallery.cards().len(), 2);
    }
}
