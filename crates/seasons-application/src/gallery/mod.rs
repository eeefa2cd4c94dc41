//! Gallery of the signed-in user's cards.
//!
//! - `view`: pure derivation of the filtered view and reorder reconciliation
//! - `view_model`: `GalleryViewModel` with pagination and fetch bookkeeping

mod view;
mod view_model;

pub use view::{derive_view, reorder_cards};
pub use view_model::{FetchOutcome, FetchRequest, GalleryViewModel};
