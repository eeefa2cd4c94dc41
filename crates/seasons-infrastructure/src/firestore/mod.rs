//! Firestore REST backends.
//!
//! - `client`: authenticated HTTP access to the documents API
//! - `document`: mapping between domain models and Firestore typed values
//! - `card_repository` / `user_repository`: the repository implementations

mod card_repository;
mod client;
pub mod document;
mod user_repository;

pub use card_repository::FirestoreCardRepository;
pub use client::FirestoreClient;
pub use user_repository::FirestoreUserProfileRepository;
