//! User domain module.
//!
//! - `model`: `UserProfile` and the nickname rule
//! - `repository`: persistence seam for the `users` collection
//!
//! ```ignore
//! use seasons_core::user::{UserProfile, UserProfileRepository, validate_nickname};
//! ```

mod model;
pub mod repository;

pub use model::{MAX_NICKNAME_LEN, UserProfile, validate_nickname};
pub use repository::UserProfileRepository;

/// Name of the document collection holding user profiles.
pub const USERS_COLLECTION: &str = "users";
