//! Firebase Storage REST object store.
//!
//! Uploads use the resumable protocol: a `start` request returns a session
//! URL, chunks are posted with their offset, and the last chunk carries the
//! `finalize` command. The public URL is built from the object's download
//! token, fetched in a separate metadata request.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;

use seasons_core::attachment::{AttachmentFile, ObjectStore, TransferProgress};
use seasons_core::config::BackendConfig;
use seasons_core::error::{Result, SeasonsError};
use seasons_core::identity::IdentityProvider;

const STORAGE_API: &str = "https://firebasestorage.googleapis.com/v0";

/// Chunk size for resumable uploads; the protocol wants multiples of 256 KiB.
pub const UPLOAD_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

#[derive(Clone)]
pub struct FirebaseStorageObjectStore {
    http: Client,
    api_base: String,
    bucket: String,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl FirebaseStorageObjectStore {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        config.ensure_complete()?;
        Ok(Self::with_api_base(STORAGE_API, config.storage_bucket.clone()))
    }

    /// Points the store at an arbitrary API root (emulators).
    pub fn with_api_base(api_base: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            bucket: bucket.into(),
            identity: None,
        }
    }

    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// `<api>/b/<bucket>/o`, the collection URL used to start uploads.
    fn objects_url(&self) -> Result<Url> {
        Url::parse(&format!("{}/b/{}/o", self.api_base, self.bucket))
            .map_err(|e| SeasonsError::config(format!("invalid storage URL: {}", e)))
    }

    /// `<api>/b/<bucket>/o/<path with '/' escaped>`.
    pub fn object_url(&self, path: &str) -> Result<Url> {
        let mut url = self.objects_url()?;
        url.path_segments_mut()
            .map_err(|_| SeasonsError::config("storage URL cannot have path segments"))?
            .push(path);
        Ok(url)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = match &self.identity {
            Some(identity) => identity
                .id_token()
                .await
                .map_err(|e| SeasonsError::upload(format!("could not obtain ID token: {}", e)))?,
            None => None,
        };
        Ok(match token {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| SeasonsError::upload(format!("transport failure: {}", e)))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(SeasonsError::upload(format!(
            "storage returned {}: {}",
            status,
            body.trim()
        )))
    }

    async fn start_session(&self, path: &str, file: &AttachmentFile) -> Result<String> {
        let mut url = self.objects_url()?;
        url.query_pairs_mut().append_pair("name", path);

        let request = self
            .http
            .post(url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", file.size().to_string())
            .header("X-Goog-Upload-Header-Content-Type", file.media_type.as_str())
            .json(&json!({ "name": path, "contentType": file.media_type }));

        let response = self.send(request).await?;
        response
            .headers()
            .get("X-Goog-Upload-URL")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| SeasonsError::upload("storage did not return an upload session URL"))
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorageObjectStore {
    async fn put_resumable(
        &self,
        path: &str,
        file: &AttachmentFile,
        progress: UnboundedSender<TransferProgress>,
    ) -> Result<()> {
        let session_url = self.start_session(path, file).await?;
        let total_bytes = file.size();
        tracing::debug!(
            "[FirebaseStorage] Upload session started for {} ({} bytes)",
            path,
            total_bytes
        );

        let _ = progress.send(TransferProgress {
            bytes_transferred: 0,
            total_bytes,
        });

        let chunks: Vec<&[u8]> = if file.bytes.is_empty() {
            vec![file.bytes.as_slice()]
        } else {
            file.bytes.chunks(UPLOAD_CHUNK_SIZE).collect()
        };
        let last = chunks.len() - 1;
        let mut offset: u64 = 0;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let command = if index == last {
                "upload, finalize"
            } else {
                "upload"
            };
            let request = self
                .http
                .post(session_url.as_str())
                .header("X-Goog-Upload-Command", command)
                .header("X-Goog-Upload-Offset", offset.to_string())
                .body(chunk.to_vec());
            self.send(request).await?;

            offset += chunk.len() as u64;
            let _ = progress.send(TransferProgress {
                bytes_transferred: offset,
                total_bytes,
            });
        }

        tracing::debug!("[FirebaseStorage] Upload finalized for {}", path);
        Ok(())
    }

    async fn public_url(&self, path: &str) -> Result<String> {
        let url = self.object_url(path)?;
        let response = self.send(self.http.get(url.clone())).await?;
        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| SeasonsError::upload(format!("malformed object metadata: {}", e)))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| SeasonsError::upload(format!("no download token for '{}'", path)))?
            .to_string();

        let mut public = url;
        public
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", &token);
        Ok(public.to_string())
    }
}
