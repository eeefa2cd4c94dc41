//! Card domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::season::Season;

/// Image attached to a card. A card has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Publicly retrievable URL returned by the object store.
    pub url: String,
    /// Media kind, e.g. `image/png` or the legacy value `image`.
    pub media_kind: String,
    /// Short label shown next to the attachment (usually the file name).
    pub label: String,
}

/// A user-authored seasonal message as stored in the `cards` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Store-assigned identifier.
    pub id: String,
    /// Message body, never empty.
    pub content: String,
    /// Uid of the creator. Never changes after creation.
    pub owner_id: String,
    pub season: Season,
    /// Display only; no ordering guarantee is derived from it.
    pub created_at: DateTime<Utc>,
    /// Creator's display name at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Creator's nickname at write time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl Card {
    /// Name shown as the card's author: nickname first, then display name.
    pub fn author_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.display_name.as_deref())
            .unwrap_or_default()
    }
}

/// Input for creating a card. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub content: String,
    pub owner_id: String,
    pub season: Season,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl NewCard {
    /// Materializes the stored record once the store has assigned an id.
    pub fn into_card(self, id: impl Into<String>, created_at: DateTime<Utc>) -> Card {
        Card {
            id: id.into(),
            content: self.content,
            owner_id: self.owner_id,
            season: self.season,
            created_at,
            display_name: self.display_name,
            nickname: self.nickname,
            attachment: self.attachment,
        }
    }
}
