//! Error types for the Seasons application.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Seasons application.
///
/// The first five variants are the user-facing taxonomy: every failure at
/// a remote boundary is converted into one of them before it reaches the
/// presentation layer. The rest cover local plumbing (config files,
/// serialization) and are folded into a generic message for users.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SeasonsError {
    /// Sign-in or sign-out failed, or an operation needs a signed-in user.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Local input rejected before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote document store read failed.
    #[error("Query error: {0}")]
    Query(String),

    /// Remote document store write failed.
    #[error("Write error: {0}")]
    Write(String),

    /// Attachment transfer or URL retrieval failed.
    #[error("Upload error: {0}")]
    Upload(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SeasonsError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Creates a Write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Creates an Upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write(_))
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the user can simply try the same action again.
    ///
    /// Validation failures need the input changed first; everything that
    /// crossed a network boundary is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Auth(_) | Self::Query(_) | Self::Write(_) | Self::Upload(_)
        )
    }

    /// Message suitable for an inline hint or a dismissible banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => "Sign-in failed, please try again".to_string(),
            Self::Validation(message) => message.clone(),
            Self::Query(_) => "Could not load your cards".to_string(),
            Self::Write(_) | Self::NotFound { .. } => "Could not save your changes".to_string(),
            Self::Upload(_) => "The image could not be uploaded".to_string(),
            Self::Io { .. }
            | Self::Serialization { .. }
            | Self::Config(_)
            | Self::Internal(_) => "An unexpected error occurred".to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SeasonsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SeasonsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SeasonsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SeasonsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Transport failures carry no operation context, so they land in
/// `Internal`; repositories map them to `Query`/`Write`/`Upload` themselves.
impl From<reqwest::Error> for SeasonsError {
    fn from(err: reqwest::Error) -> Self {
        Self::Internal(format!("HTTP transport error: {}", err))
    }
}

/// Conversion from anyhow::Error (used by bootstrap helpers)
impl From<anyhow::Error> for SeasonsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SeasonsError>`.
pub type Result<T> = std::result::Result<T, SeasonsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_shown_verbatim() {
        let err = SeasonsError::validation("Content cannot be empty");
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Content cannot be empty");
    }

    #[test]
    fn test_remote_errors_are_retryable() {
        assert!(SeasonsError::query("boom").is_retryable());
        assert!(SeasonsError::write("boom").is_retryable());
        assert!(SeasonsError::upload("boom").is_retryable());
        assert!(SeasonsError::auth("popup closed").is_retryable());
        assert!(!SeasonsError::config("bad").is_retryable());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SeasonsError = io.into();
        match err {
            SeasonsError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
