//! Attachment domain module.
//!
//! - `model`: the locally selected file and its validation rules
//! - `store`: the object store seam used by the uploader

mod model;
pub mod store;

pub use model::{AttachmentFile, MAX_ATTACHMENT_BYTES, storage_path};
pub use store::{ObjectStore, TransferProgress};
