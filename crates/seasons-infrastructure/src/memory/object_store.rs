//! In-memory `ObjectStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use seasons_core::attachment::{AttachmentFile, ObjectStore, TransferProgress};
use seasons_core::error::{Result, SeasonsError};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// Default chunk size, matching the hosted resumable protocol.
pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// Object store that keeps uploads in a map and reports progress per chunk.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    chunk_size: usize,
    base_url: String,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            base_url: "memory://objects".to_string(),
        }
    }

    /// Sets the transfer chunk size. Values below one byte are raised to one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub async fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.read().await.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_resumable(
        &self,
        path: &str,
        file: &AttachmentFile,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<()> {
        let total_bytes = file.size();
        let mut received = Vec::with_capacity(file.bytes.len());

        let _ = progress.send(TransferProgress {
            bytes_transferred: 0,
            total_bytes,
        });
        for chunk in file.bytes.chunks(self.chunk_size) {
            received.extend_from_slice(chunk);
            let _ = progress.send(TransferProgress {
                bytes_transferred: received.len() as u64,
                total_bytes,
            });
            tokio::task::yield_now().await;
        }

        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                media_type: file.media_type.clone(),
                bytes: received,
            },
        );
        Ok(())
    }

    async fn public_url(&self, path: &str) -> Result<String> {
        if self.objects.read().await.contains_key(path) {
            Ok(format!("{}/{}", self.base_url, path))
        } else {
            Err(SeasonsError::upload(format!("object '{}' does not exist", path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_put_reports_each_chunk() {
        let store = InMemoryObjectStore::new().with_chunk_size(4);
        let file = AttachmentFile::new("a.png", "image/png", vec![7u8; 10]);
        let (tx, mut rx) = mpsc::unbounded_channel();

        store.put_resumable("cards/u/1.png", &file, tx).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(p) = rx.try_recv() {
            seen.push(p.bytes_transferred);
        }
        assert_eq!(seen, vec![0, 4, 8, 10]);
        assert_eq!(store.get("cards/u/1.png").await.unwrap().bytes.len(), 10);
    }

    #[tokio::test]
    async fn test_public_url_requires_object() {
        let store = InMemoryObjectStore::new();
        assert!(store.public_url("cards/u/missing.png").await.unwrap_err().is_upload());
    }
}
