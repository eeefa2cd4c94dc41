//! Firestore-backed `CardRepository`.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value, json};

use seasons_core::card::{
    CARDS_COLLECTION, CardPage, CardRepository, NewCard, PageCursor, PageRequest,
};
use seasons_core::error::{Result, SeasonsError};
use seasons_core::season::Season;

use super::client::FirestoreClient;
use super::document::{decode_card, encode_new_card, string_value};

/// Owner field names, current first.
const OWNER_FIELDS: [&str; 2] = ["ownerId", "userId"];

/// Cards stored in the `cards` collection, listed in document-name order.
///
/// Cursors are full document resource names, fed back through
/// `startAt { before: false }`.
#[derive(Clone)]
pub struct FirestoreCardRepository {
    client: FirestoreClient,
}

impl FirestoreCardRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Builds the owner listing query; asks for one extra row to learn
    /// whether another page exists.
    ///
    /// Matches the owner under both `ownerId` and the legacy `userId` field.
    pub fn owner_query(owner_id: &str, page: &PageRequest) -> Value {
        let owner_filters: Vec<Value> = OWNER_FIELDS
            .iter()
            .map(|field| {
                json!({
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": string_value(owner_id)
                    }
                })
            })
            .collect();
        let mut query = json!({
            "from": [{ "collectionId": CARDS_COLLECTION }],
            "where": {
                "compositeFilter": {
                    "op": "OR",
                    "filters": owner_filters
                }
            },
            "orderBy": [{ "field": { "fieldPath": "__name__" }, "direction": "ASCENDING" }],
            "limit": page.page_size + 1
        });
        if let Some(cursor) = &page.cursor {
            query["startAt"] = json!({
                "values": [{ "referenceValue": cursor.as_str() }],
                "before": false
            });
        }
        query
    }
}

#[async_trait]
impl CardRepository for FirestoreCardRepository {
    async fn create(&self, card: NewCard) -> Result<String> {
        let fields = encode_new_card(&card, Utc::now());
        let document = self.client.create_document(CARDS_COLLECTION, fields).await?;
        let id = document.id().to_string();
        if id.is_empty() {
            return Err(SeasonsError::write("store returned a document without a name"));
        }
        tracing::debug!("[FirestoreCardRepository] Created card {}", id);
        Ok(id)
    }

    async fn list_by_owner(&self, owner_id: &str, page: PageRequest) -> Result<CardPage> {
        if page.page_size == 0 {
            return Err(SeasonsError::query("page size must be positive"));
        }

        let query = Self::owner_query(owner_id, &page);
        let mut documents = self.client.run_query(query).await?;
        tracing::debug!(
            "[FirestoreCardRepository] Query for {} returned {} documents",
            owner_id,
            documents.len()
        );

        let has_more = documents.len() > page.page_size;
        documents.truncate(page.page_size);
        let next_cursor = if has_more {
            documents.last().map(|doc| PageCursor::new(doc.name.clone()))
        } else {
            None
        };

        Ok(CardPage {
            cards: documents
                .iter()
                .map(|doc| decode_card(doc, owner_id))
                .collect(),
            next_cursor,
        })
    }

    async fn update_season(&self, card_id: &str, season: Season) -> Result<()> {
        let mut fields = Map::new();
        fields.insert("season".into(), string_value(season.as_ref()));
        self.client
            .patch_document(CARDS_COLLECTION, card_id, fields, &["season"], true)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::document::Document;

    #[test]
    fn test_first_page_query_shape() {
        let query = FirestoreCardRepository::owner_query("uid-1", &PageRequest::first(12));
        assert_eq!(query["limit"], 13);
        let owner = &query["where"]["compositeFilter"];
        assert_eq!(owner["op"], "OR");
        assert_eq!(owner["filters"].as_array().map(Vec::len), Some(2));
        assert_eq!(query["orderBy"][0]["field"]["fieldPath"], "__name__");
        assert!(query.get("startAt").is_none());
    }

    #[test]
    fn test_query_matches_legacy_owner_field() {
        let query = FirestoreCardRepository::owner_query("uid-1", &PageRequest::first(12));
        let fields: Vec<(&str, &str)> = query["where"]["compositeFilter"]["filters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|filter| {
                let filter = &filter["fieldFilter"];
                assert_eq!(filter["op"], "EQUAL");
                (
                    filter["field"]["fieldPath"].as_str().unwrap(),
                    filter["value"]["stringValue"].as_str().unwrap(),
                )
            })
            .collect();

        assert_eq!(fields, vec![("ownerId", "uid-1"), ("userId", "uid-1")]);
    }

    #[test]
    fn test_legacy_record_decodes_with_owner() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/cards/old1",
            "fields": {
                "content": { "stringValue": "Old card" },
                "userId": { "stringValue": "uid-1" },
                "category": { "stringValue": "autumn" }
            }
        }))
        .unwrap();

        let card = decode_card(&doc, "uid-1");

        assert_eq!(card.owner_id, "uid-1");
        assert_eq!(card.season, Season::Autumn);
    }

    #[test]
    fn test_cursor_becomes_start_after() {
        let cursor = PageCursor::new("projects/p/databases/(default)/documents/cards/abc");
        let query = FirestoreCardRepository::owner_query("uid-1", &PageRequest::after(12, cursor));
        assert_eq!(query["startAt"]["before"], false);
        assert_eq!(
            query["startAt"]["values"][0]["referenceValue"],
            "projects/p/databases/(default)/documents/cards/abc"
        );
    }
}
