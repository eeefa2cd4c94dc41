//! Application layer for Seasons.
//!
//! Use cases that coordinate the domain seams from `seasons-core`:
//! session tracking, attachment uploads, the gallery view-model, the card
//! composer and the account page, plus the `bootstrap` composition root
//! that wires them to configured backends.

pub mod account_service;
pub mod bootstrap;
pub mod composer;
pub mod gallery;
pub mod identity_session;
pub mod uploader;

pub use account_service::AccountService;
pub use bootstrap::{AppBootstrap, BackendKind, bootstrap};
pub use composer::{CardComposer, ComposerPhase};
pub use gallery::GalleryViewModel;
pub use identity_session::IdentitySession;
pub use uploader::{AttachmentUploader, UploadEvent, UploadTask};
