//! Card repository trait.
//!
//! Defines the interface to the remote document store for the `cards`
//! collection. Every call crosses a network boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::{Card, NewCard};
use crate::error::Result;
use crate::season::Season;

/// Number of cards fetched per gallery page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Opaque position in an owner's card listing.
///
/// Produced by the repository, handed back unchanged to fetch the next
/// page. Its contents are backend specific.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A bounded listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    /// Start after this position; `None` starts at the beginning.
    pub cursor: Option<PageCursor>,
}

impl PageRequest {
    pub fn first(page_size: usize) -> Self {
        Self {
            page_size,
            cursor: None,
        }
    }

    pub fn after(page_size: usize, cursor: PageCursor) -> Self {
        Self {
            page_size,
            cursor: Some(cursor),
        }
    }
}

/// One page of cards plus the cursor for the following page, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardPage {
    pub cards: Vec<Card>,
    pub next_cursor: Option<PageCursor>,
}

/// An abstract repository for the `cards` collection.
///
/// Implementations map transport and permission failures to
/// `SeasonsError::Write` for mutations and `SeasonsError::Query` for reads.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Writes a new card and returns the id assigned by the store.
    ///
    /// # Errors
    ///
    /// `Write` on transport or permission failure.
    async fn create(&self, card: NewCard) -> Result<String>;

    /// Lists at most `page.page_size` cards whose `ownerId` equals `owner_id`.
    ///
    /// Results are ordered by the store's document order, which is what the
    /// cursor walks; no other ordering is promised.
    ///
    /// # Errors
    ///
    /// `Query` on transport or permission failure.
    async fn list_by_owner(&self, owner_id: &str, page: PageRequest) -> Result<CardPage>;

    /// Replaces the `season` field of one card and nothing else.
    ///
    /// # Errors
    ///
    /// `Write` if the card is missing, the caller is not allowed to modify
    /// it, or the transport fails.
    async fn update_season(&self, card_id: &str, season: Season) -> Result<()>;
}
