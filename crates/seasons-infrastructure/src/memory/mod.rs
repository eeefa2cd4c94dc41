//! Process-local backends.
//!
//! Keep everything in memory behind the same traits as the hosted
//! backends. Used for local runs without a project and throughout the
//! test suites.

mod card_repository;
mod identity_provider;
mod object_store;
mod user_repository;

pub use card_repository::InMemoryCardRepository;
pub use identity_provider::LocalIdentityProvider;
pub use object_store::InMemoryObjectStore;
pub use user_repository::InMemoryUserProfileRepository;
