//! Mapping between domain models and Firestore documents.
//!
//! Firestore REST wraps every field in a typed value
//! (`{"stringValue": "..."}`, `{"timestampValue": "..."}`, ...). Decoding is
//! lenient: records written by older clients used different field names,
//! and a missing or unknown season reads as the fallback season.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use seasons_core::card::{Attachment, Card, NewCard};
use seasons_core::season::Season;
use seasons_core::user::UserProfile;

/// Label shown for attachments recovered from a bare legacy `imageUrl`.
pub const LEGACY_ATTACHMENT_LABEL: &str = "Attached image";

/// Fields written by a profile upsert; also the update mask.
pub const PROFILE_FIELDS: [&str; 5] = ["id", "nickname", "email", "displayName", "photoURL"];

/// A Firestore document as returned by the REST API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name: `projects/<p>/databases/(default)/documents/<collection>/<id>`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl Document {
    pub fn with_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Default::default()
        }
    }

    /// The last segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }
}

// ============================================================================
// Typed value helpers
// ============================================================================

pub fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

pub fn null_value() -> Value {
    json!({ "nullValue": null })
}

pub fn optional_string_value(value: Option<&str>) -> Value {
    value.map(string_value).unwrap_or_else(null_value)
}

pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    json!({ "timestampValue": at.to_rfc3339_opts(SecondsFormat::Micros, true) })
}

pub fn map_value(fields: Map<String, Value>) -> Value {
    json!({ "mapValue": { "fields": fields } })
}

fn read_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn read_non_empty(fields: &Map<String, Value>, key: &str) -> Option<String> {
    read_string(fields, key).filter(|value| !value.is_empty())
}

fn read_timestamp(fields: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let value = fields.get(key)?;
    let raw = value
        .get("timestampValue")
        .or_else(|| value.get("stringValue"))?
        .as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

fn read_map<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    fields
        .get(key)?
        .get("mapValue")?
        .get("fields")?
        .as_object()
}

// ============================================================================
// Cards
// ============================================================================

/// Encodes a new card with the write-time `created_at`.
pub fn encode_new_card(card: &NewCard, created_at: DateTime<Utc>) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("content".into(), string_value(&card.content));
    fields.insert("ownerId".into(), string_value(&card.owner_id));
    fields.insert("season".into(), string_value(card.season.as_ref()));
    fields.insert("createdAt".into(), timestamp_value(created_at));
    if let Some(display_name) = &card.display_name {
        fields.insert("displayName".into(), string_value(display_name));
    }
    if let Some(nickname) = &card.nickname {
        fields.insert("nickname".into(), string_value(nickname));
    }
    if let Some(attachment) = &card.attachment {
        let mut inner = Map::new();
        inner.insert("url".into(), string_value(&attachment.url));
        inner.insert("mediaKind".into(), string_value(&attachment.media_kind));
        inner.insert("label".into(), string_value(&attachment.label));
        fields.insert("attachment".into(), map_value(inner));
    }
    fields
}

fn decode_attachment(fields: &Map<String, Value>) -> Option<Attachment> {
    if let Some(inner) = read_map(fields, "attachment") {
        let url = read_non_empty(inner, "url")?;
        return Some(Attachment {
            url,
            media_kind: read_non_empty(inner, "mediaKind")
                .or_else(|| read_non_empty(inner, "type"))
                .unwrap_or_else(|| "image".to_string()),
            label: read_non_empty(inner, "label")
                .or_else(|| read_non_empty(inner, "name"))
                .unwrap_or_else(|| LEGACY_ATTACHMENT_LABEL.to_string()),
        });
    }

    read_non_empty(fields, "imageUrl").map(|url| Attachment {
        url,
        media_kind: "image".to_string(),
        label: LEGACY_ATTACHMENT_LABEL.to_string(),
    })
}

/// Decodes a card document.
///
/// `owner_hint` is the uid the query filtered on; it fills in records that
/// lack an owner field entirely.
pub fn decode_card(doc: &Document, owner_hint: &str) -> Card {
    let fields = &doc.fields;
    let season_tag = read_string(fields, "season").or_else(|| read_string(fields, "category"));

    Card {
        id: doc.id().to_string(),
        content: read_string(fields, "content").unwrap_or_default(),
        owner_id: read_non_empty(fields, "ownerId")
            .or_else(|| read_non_empty(fields, "userId"))
            .unwrap_or_else(|| owner_hint.to_string()),
        season: Season::parse_or_fallback(season_tag.as_deref()),
        created_at: read_timestamp(fields, "createdAt").unwrap_or_else(Utc::now),
        display_name: read_non_empty(fields, "displayName")
            .or_else(|| read_non_empty(fields, "userName")),
        nickname: read_non_empty(fields, "nickname")
            .or_else(|| read_non_empty(fields, "userNickname")),
        attachment: decode_attachment(fields),
    }
}

// ============================================================================
// Profiles
// ============================================================================

pub fn encode_profile(profile: &UserProfile) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert("id".into(), string_value(&profile.id));
    fields.insert(
        "nickname".into(),
        optional_string_value(profile.nickname.as_deref()),
    );
    fields.insert("email".into(), optional_string_value(profile.email.as_deref()));
    fields.insert(
        "displayName".into(),
        optional_string_value(profile.display_name.as_deref()),
    );
    fields.insert(
        "photoURL".into(),
        optional_string_value(profile.photo_url.as_deref()),
    );
    fields
}

pub fn decode_profile(doc: &Document) -> UserProfile {
    let fields = &doc.fields;
    UserProfile {
        id: read_non_empty(fields, "id").unwrap_or_else(|| doc.id().to_string()),
        nickname: read_non_empty(fields, "nickname"),
        email: read_non_empty(fields, "email"),
        display_name: read_non_empty(fields, "displayName"),
        photo_url: read_non_empty(fields, "photoURL"),
    }
}
