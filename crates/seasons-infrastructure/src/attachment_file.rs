//! Loading user-selected files from disk.

use std::path::Path;

use seasons_core::attachment::{AttachmentFile, MAX_ATTACHMENT_BYTES};
use seasons_core::error::{Result, SeasonsError};

/// Infers the MIME type from a filename extension using `mime_guess`.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Reads `path` into an [`AttachmentFile`] and validates it.
///
/// The size check runs on the file metadata before any bytes are read, so
/// oversized files are rejected without loading them.
pub async fn load_attachment(path: &Path) -> Result<AttachmentFile> {
    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_ATTACHMENT_BYTES {
        return Err(SeasonsError::validation(
            "The file is too large (maximum 5 MB)",
        ));
    }

    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SeasonsError::validation("The file name is not valid UTF-8"))?
        .to_string();
    let media_type = infer_mime_type(path);
    let bytes = tokio::fs::read(path).await?;

    let file = AttachmentFile::new(name, media_type, bytes);
    file.validate()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_loads_png_with_media_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("leaf.png");
        tokio::fs::write(&path, b"\x89PNG....").await.unwrap();

        let file = load_attachment(&path).await.unwrap();
        assert_eq!(file.name, "leaf.png");
        assert_eq!(file.media_type, "image/png");
        assert_eq!(file.size(), 8);
    }

    #[tokio::test]
    async fn test_rejects_text_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let err = load_attachment(&path).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_rejects_oversized_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.jpg");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_ATTACHMENT_BYTES + 1).unwrap();

        let err = load_attachment(&path).await.unwrap_err();
        assert!(err.is_validation());
    }
}
