//! Card domain module.
//!
//! # Module Structure
//!
//! - `model`: `Card`, `NewCard` and the attachment value object
//! - `repository`: `CardRepository` trait and its pagination types
//!
//! # Usage
//!
//! ```ignore
//! use seasons_core::card::{Card, NewCard, CardRepository, PageRequest};
//! ```

mod model;
pub mod repository;

// Re-export public API
pub use model::{Attachment, Card, NewCard};
pub use repository::{CardPage, CardRepository, DEFAULT_PAGE_SIZE, PageCursor, PageRequest};

/// Name of the document collection holding cards.
pub const CARDS_COLLECTION: &str = "cards";
