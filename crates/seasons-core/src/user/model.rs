//! UserProfile domain model.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeasonsError};
use crate::identity::Identity;

/// Longest nickname accepted, in characters.
pub const MAX_NICKNAME_LEN: usize = 12;

static NICKNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("nickname pattern is valid"));

/// Checks a non-empty nickname against the account rules.
///
/// An empty string is accepted by the account form as "no nickname" before
/// this is called; here it is rejected like any other non-alphanumeric input.
pub fn validate_nickname(nickname: &str) -> Result<()> {
    if nickname.chars().count() > MAX_NICKNAME_LEN || !NICKNAME_PATTERN.is_match(nickname) {
        return Err(SeasonsError::validation(format!(
            "Nickname must be at most {} alphanumeric characters",
            MAX_NICKNAME_LEN
        )));
    }
    Ok(())
}

/// Per-user record stored under `users/<uid>`.
///
/// Only `nickname` is edited by the user; the other fields mirror the
/// identity provider and are refreshed on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl UserProfile {
    /// Builds the record mirrored from `identity` with the given nickname.
    pub fn from_identity(identity: &Identity, nickname: Option<String>) -> Self {
        Self {
            id: identity.uid.clone(),
            nickname,
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_long_nickname() {
        let err = validate_nickname("thisisaverylongname123").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_accepts_alphanumeric_nickname() {
        assert!(validate_nickname("Al1ce").is_ok());
        assert!(validate_nickname("abcdefghijkl").is_ok());
    }

    #[test]
    fn test_rejects_symbols_and_spaces() {
        assert!(validate_nickname("al ice").is_err());
        assert!(validate_nickname("al_ice").is_err());
        assert!(validate_nickname("élise").is_err());
        assert!(validate_nickname("").is_err());
    }

    #[test]
    fn test_from_identity_mirrors_provider_fields() {
        let identity = Identity::new("uid-1")
            .with_email("alice@example.com")
            .with_display_name("Alice");
        let profile = UserProfile::from_identity(&identity, Some("Al1ce".to_string()));
        assert_eq!(profile.id, "uid-1");
        assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
        assert_eq!(profile.display_name.as_deref(), Some("Alice"));
        assert!(profile.photo_url.is_none());
    }
}
