use std::path::Path;

use crate::error::{Result, SeasonsError};

/// Largest accepted attachment: 5 MiB.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// A file chosen by the user, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    /// Original file name including extension.
    pub name: String,
    /// Media type, e.g. `image/png`.
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl AttachmentFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    /// Rejects files the store must never see: oversized or not an image.
    pub fn validate(&self) -> Result<()> {
        if self.size() > MAX_ATTACHMENT_BYTES {
            return Err(SeasonsError::validation(
                "The file is too large (maximum 5 MB)",
            ));
        }
        if !self.is_image() {
            return Err(SeasonsError::validation("Only images are accepted"));
        }
        Ok(())
    }

    /// Extension used for the stored object name.
    ///
    /// Taken from the original name; falls back to the media subtype
    /// (`image/png` → `png`) when the name has none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| {
                self.media_type
                    .split('/')
                    .nth(1)
                    .and_then(|sub| sub.split(['+', ';']).next())
                    .filter(|sub| !sub.is_empty())
                    .unwrap_or("bin")
                    .to_string()
            })
    }
}

/// Object path for an attachment: `cards/<ownerId>/<unixMillis>.<ext>`.
pub fn storage_path(owner_id: &str, unix_millis: i64, file: &AttachmentFile) -> String {
    format!("cards/{}/{}.{}", owner_id, unix_millis, file.extension())
}
