use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Profile issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Provider-issued user id. Cards and profiles are keyed by it.
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_photo_url(mut self, photo_url: impl Into<String>) -> Self {
        self.photo_url = Some(photo_url.into());
        self
    }
}

/// OAuth scopes requested during interactive sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AuthScope {
    Email,
    Profile,
}

impl AuthScope {
    /// Scopes requested by the application on every sign-in.
    pub const SIGN_IN: [AuthScope; 2] = [AuthScope::Email, AuthScope::Profile];
}

/// Where the application lands after a session is established or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LandingView {
    /// The signed-in user's card gallery.
    Gallery,
    /// The sign-in screen.
    Login,
}

impl LandingView {
    pub fn for_session(identity: Option<&Identity>) -> Self {
        if identity.is_some() {
            LandingView::Gallery
        } else {
            LandingView::Login
        }
    }
}
