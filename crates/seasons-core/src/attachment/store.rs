//! Object store seam.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::model::AttachmentFile;
use crate::error::Result;

/// Bytes moved so far during one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Completion as a whole percentage in `[0, 100]`.
    ///
    /// An empty transfer counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        let done = self.bytes_transferred.min(self.total_bytes);
        ((done as f64 / self.total_bytes as f64) * 100.0).round() as u8
    }
}

/// Remote object storage supporting resumable uploads and public URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Streams `file` to `path`, reporting progress on `progress` as chunks land.
    ///
    /// Returns once the object is fully stored. Dropped receivers are ignored.
    async fn put_resumable(
        &self,
        path: &str,
        file: &AttachmentFile,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<()>;

    /// Resolves the public retrieval URL of a stored object.
    ///
    /// Separate from the upload; it can fail on its own.
    async fn public_url(&self, path: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_bounds() {
        let p = |done, total| TransferProgress {
            bytes_transferred: done,
            total_bytes: total,
        };
        assert_eq!(p(0, 10).percent(), 0);
        assert_eq!(p(5, 10).percent(), 50);
        assert_eq!(p(1, 3).percent(), 33);
        assert_eq!(p(15, 10).percent(), 100);
        assert_eq!(p(0, 0).percent(), 100);
    }
}
