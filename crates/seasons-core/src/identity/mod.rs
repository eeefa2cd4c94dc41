//! Identity domain module.
//!
//! - `model`: the authenticated user's identity and landing views
//! - `provider`: the identity provider seam and the navigation seam
//!   driven by session changes

mod model;
pub mod provider;

pub use model::{AuthScope, Identity, LandingView};
pub use provider::{IdentityProvider, Navigator};
