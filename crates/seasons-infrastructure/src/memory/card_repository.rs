//! In-memory `CardRepository`.

use async_trait::async_trait;
use chrono::Utc;
use seasons_core::card::{Card, CardPage, CardRepository, NewCard, PageCursor, PageRequest};
use seasons_core::error::{Result, SeasonsError};
use seasons_core::season::Season;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Card store kept in insertion order.
///
/// Insertion order is the document order the cursor walks, mirroring how
/// the hosted store orders by document name.
#[derive(Debug, Default)]
pub struct InMemoryCardRepository {
    cards: RwLock<Vec<Card>>,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored card, across all owners.
    pub async fn snapshot(&self) -> Vec<Card> {
        self.cards.read().await.clone()
    }

    pub async fn find_by_id(&self, card_id: &str) -> Option<Card> {
        self.cards
            .read()
            .await
            .iter()
            .find(|card| card.id == card_id)
            .cloned()
    }
}

#[async_trait]
impl CardRepository for InMemoryCardRepository {
    async fn create(&self, card: NewCard) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let stored = card.into_card(id.clone(), Utc::now());
        self.cards.write().await.push(stored);
        tracing::debug!("[InMemoryCardRepository] Created card {}", id);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str, page: PageRequest) -> Result<CardPage> {
        if page.page_size == 0 {
            return Err(SeasonsError::query("page size must be positive"));
        }

        let cards = self.cards.read().await;
        let owned: Vec<&Card> = cards.iter().filter(|card| card.owner_id == owner_id).collect();

        let start = match &page.cursor {
            None => 0,
            Some(cursor) => owned
                .iter()
                .position(|card| card.id == cursor.as_str())
                .map(|index| index + 1)
                .ok_or_else(|| {
                    SeasonsError::query(format!("unknown page cursor '{}'", cursor.as_str()))
                })?,
        };

        let mut window: Vec<Card> = owned
            .into_iter()
            .skip(start)
            .take(page.page_size + 1)
            .cloned()
            .collect();

        let has_more = window.len() > page.page_size;
        window.truncate(page.page_size);
        let next_cursor = if has_more {
            window.last().map(|card| PageCursor::new(card.id.clone()))
        } else {
            None
        };

        Ok(CardPage {
            cards: window,
            next_cursor,
        })
    }

    async fn update_season(&self, card_id: &str, season: Season) -> Result<()> {
        let mut cards = self.cards.write().await;
        let card = cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| SeasonsError::write(format!("card '{}' does not exist", card_id)))?;
        card.season = season;
        Ok(())
    }
}
