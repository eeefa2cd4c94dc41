//! Domain layer for Seasons.
//!
//! Models, trait seams and the shared error type. Nothing in this crate
//! talks to the network; concrete backends live in `seasons-infrastructure`
//! and use cases in `seasons-application`.

pub mod attachment;
pub mod card;
pub mod config;
pub mod error;
pub mod identity;
pub mod season;
pub mod user;

// Re-export common error type
pub use error::SeasonsError;
pub use season::Season;
