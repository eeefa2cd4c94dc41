//! Attachment uploads as cancellable background tasks.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::Utc;
use futures::Stream;
use seasons_core::attachment::{AttachmentFile, ObjectStore, TransferProgress, storage_path};
use seasons_core::error::{Result, SeasonsError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// One event of an upload, in order: zero or more `Progress`, then exactly
/// one terminal `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    /// Whole percentage transferred. Never decreases within one upload.
    Progress(u8),
    /// Public URL of the stored object.
    Completed(String),
    Failed(SeasonsError),
}

impl UploadEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress(_))
    }
}

/// Uploads validated image files to the object store.
#[derive(Clone)]
pub struct AttachmentUploader {
    store: Arc<dyn ObjectStore>,
}

impl AttachmentUploader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Validates `file` and starts uploading it under `owner_id`'s folder.
    ///
    /// Oversized and non-image files are rejected here with `Validation`
    /// and the store is never contacted. Must be called within a tokio
    /// runtime.
    pub fn upload(&self, file: AttachmentFile, owner_id: &str) -> Result<UploadTask> {
        file.validate()?;

        let path = storage_path(owner_id, Utc::now().timestamp_millis(), &file);
        tracing::debug!(
            "[Uploader] Uploading '{}' ({} bytes) to {}",
            file.name,
            file.size(),
            path
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(run_upload(
            Arc::clone(&self.store),
            path.clone(),
            file,
            events_tx,
            cancel.clone(),
        ));

        Ok(UploadTask {
            events: events_rx,
            cancel,
            path,
            finished: false,
        })
    }
}

async fn run_upload(
    store: Arc<dyn ObjectStore>,
    path: String,
    file: AttachmentFile,
    events: UnboundedSender<UploadEvent>,
    cancel: CancellationToken,
) {
    let mut reporter = ProgressReporter::new(&events);
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<TransferProgress>();

    let put = store.put_resumable(&path, &file, progress_tx);
    tokio::pin!(put);

    let transfer = loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break Err(SeasonsError::upload("upload cancelled"));
            }
            result = &mut put => break result,
            Some(progress) = progress_rx.recv() => reporter.report(progress),
        }
    };

    while let Ok(progress) = progress_rx.try_recv() {
        reporter.report(progress);
    }

    let outcome = match transfer {
        Ok(()) => tokio::select! {
            _ = cancel.cancelled() => Err(SeasonsError::upload("upload cancelled")),
            url = store.public_url(&path) => url,
        },
        Err(e) => Err(e),
    };

    let event = match outcome {
        Ok(url) => {
            reporter.report(TransferProgress {
                bytes_transferred: file.size(),
                total_bytes: file.size(),
            });
            tracing::info!("[Uploader] Stored {}", path);
            UploadEvent::Completed(url)
        }
        Err(e) => {
            let e = into_upload_error(e);
            tracing::warn!("[Uploader] Upload to {} failed: {}", path, e);
            UploadEvent::Failed(e)
        }
    };
    let _ = events.send(event);
}

/// Forwards transfer progress as non-decreasing percentages, skipping repeats.
struct ProgressReporter<'a> {
    events: &'a UnboundedSender<UploadEvent>,
    last: Option<u8>,
}

impl<'a> ProgressReporter<'a> {
    fn new(events: &'a UnboundedSender<UploadEvent>) -> Self {
        Self { events, last: None }
    }

    fn report(&mut self, progress: TransferProgress) {
        let percent = progress.percent();
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        let _ = self.events.send(UploadEvent::Progress(percent));
    }
}

fn into_upload_error(err: SeasonsError) -> SeasonsError {
    match err {
        SeasonsError::Upload(_) => err,
        other => SeasonsError::upload(other.to_string()),
    }
}

/// Handle to a running upload.
///
/// A finite stream of [`UploadEvent`]s; it ends right after the terminal
/// event. Dropping the handle does not stop the transfer, call
/// [`UploadTask::cancel`] for that.
#[derive(Debug)]
pub struct UploadTask {
    events: UnboundedReceiver<UploadEvent>,
    cancel: CancellationToken,
    path: String,
    finished: bool,
}

impl UploadTask {
    /// Destination object path, `cards/<owner>/<millis>.<ext>`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Requests cancellation. The stream still ends with `Failed`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drives the upload to its end, calling `on_progress` for each
    /// progress event, and returns the public URL.
    pub async fn finish(mut self, mut on_progress: impl FnMut(u8)) -> Result<String> {
        while let Some(event) = self.events.recv().await {
            match event {
                UploadEvent::Progress(percent) => on_progress(percent),
                UploadEvent::Completed(url) => return Ok(url),
                UploadEvent::Failed(e) => return Err(e),
            }
        }
        Err(SeasonsError::upload("upload ended without a result"))
    }
}

impl Stream for UploadTask {
    type Item = UploadEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.events.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                this.finished = event.is_terminal();
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
