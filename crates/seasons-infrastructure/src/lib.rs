//! Concrete backends for Seasons.
//!
//! - `memory`: process-local document, object and identity backends used
//!   for local runs and tests
//! - `firestore`: Firestore REST implementations of the card and profile
//!   repositories
//! - `firebase_storage`: Firebase Storage REST object store
//! - `config_service`, `paths`, `telemetry`: ambient setup

pub mod attachment_file;
pub mod config_service;
pub mod firebase_storage;
pub mod firestore;
pub mod memory;
pub mod paths;
pub mod telemetry;

pub use crate::attachment_file::load_attachment;
pub use crate::config_service::ConfigService;
pub use crate::firebase_storage::FirebaseStorageObjectStore;
pub use crate::firestore::{FirestoreCardRepository, FirestoreClient, FirestoreUserProfileRepository};
pub use crate::memory::{
    InMemoryCardRepository, InMemoryObjectStore, InMemoryUserProfileRepository,
    LocalIdentityProvider,
};
