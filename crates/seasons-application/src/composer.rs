//! Card composer: drafts a card and submits it.

use std::sync::Arc;

use seasons_core::Season;
use seasons_core::attachment::AttachmentFile;
use seasons_core::card::{Attachment, CardRepository, NewCard};
use seasons_core::error::{Result, SeasonsError};
use seasons_core::identity::Identity;
use seasons_core::user::UserProfileRepository;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::identity_session::IdentitySession;
use crate::uploader::AttachmentUploader;

/// Season preselected for a new draft.
pub const DEFAULT_SEASON: Season = Season::Winter;

/// Where a submission currently stands.
///
/// `Idle → Validating → (Uploading →) Persisting → Done`; any failure
/// returns to `Idle` with an error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerPhase {
    Idle,
    Validating,
    Uploading { progress: u8 },
    Persisting,
    Done { card_id: String },
}

impl ComposerPhase {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::Uploading { .. } | Self::Persisting
        )
    }
}

pub struct CardComposer {
    session: Arc<IdentitySession>,
    cards: Arc<dyn CardRepository>,
    uploader: AttachmentUploader,
    profiles: Option<Arc<dyn UserProfileRepository>>,
    content: String,
    season: Season,
    attachment: Option<AttachmentFile>,
    phase: ComposerPhase,
    error: Option<String>,
    observers: Vec<UnboundedSender<ComposerPhase>>,
}

impl CardComposer {
    pub fn new(
        session: Arc<IdentitySession>,
        cards: Arc<dyn CardRepository>,
        uploader: AttachmentUploader,
    ) -> Self {
        Self {
            session,
            cards,
            uploader,
            profiles: None,
            content: String::new(),
            season: DEFAULT_SEASON,
            attachment: None,
            phase: ComposerPhase::Idle,
            error: None,
            observers: Vec::new(),
        }
    }

    /// Looks up the author's nickname here when submitting, so the card
    /// carries it.
    pub fn with_profiles(mut self, profiles: Arc<dyn UserProfileRepository>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Receives every phase change, starting with the current phase.
    pub fn subscribe(&mut self) -> UnboundedReceiver<ComposerPhase> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.phase.clone());
        self.observers.push(tx);
        rx
    }

    // ------------------------------------------------------------------
    // Draft editing
    // ------------------------------------------------------------------

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_season(&mut self, season: Season) {
        self.season = season;
    }

    /// Selects the file to attach. Rejected files are not kept and the
    /// reason becomes the composer's error message.
    pub fn select_attachment(&mut self, file: AttachmentFile) -> Result<()> {
        if let Err(e) = file.validate() {
            tracing::warn!("[Composer] Rejected attachment '{}': {}", file.name, e);
            self.error = Some(e.user_message());
            return Err(e);
        }
        self.error = None;
        self.attachment = Some(file);
        Ok(())
    }

    pub fn clear_attachment(&mut self) {
        self.attachment = None;
    }

    /// Drops the draft and any error, back to `Idle`.
    pub fn reset(&mut self) {
        self.content.clear();
        self.season = DEFAULT_SEASON;
        self.attachment = None;
        self.error = None;
        self.set_phase(ComposerPhase::Idle);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Validates the draft, uploads the attachment if any, and creates the
    /// card. Returns the new card's id.
    ///
    /// On success the draft text and attachment are cleared. On failure the
    /// draft is kept, the phase returns to `Idle` and `error` is set.
    pub async fn submit(&mut self) -> Result<String> {
        if self.phase.is_busy() {
            return Err(SeasonsError::validation("A card is already being sent"));
        }
        self.error = None;

        match self.try_submit().await {
            Ok(card_id) => {
                tracing::info!("[Composer] Created card {}", card_id);
                self.content.clear();
                self.attachment = None;
                self.set_phase(ComposerPhase::Done {
                    card_id: card_id.clone(),
                });
                Ok(card_id)
            }
            Err(e) => {
                tracing::error!("[Composer] Submission failed: {}", e);
                self.error = Some(e.user_message());
                self.set_phase(ComposerPhase::Idle);
                Err(e)
            }
        }
    }

    async fn try_submit(&mut self) -> Result<String> {
        self.set_phase(ComposerPhase::Validating);
        let identity = self.session.require_user()?;
        let content = self.content.trim().to_string();
        if content.is_empty() {
            return Err(SeasonsError::validation("Please write a message"));
        }

        let attachment = match self.attachment.clone() {
            Some(file) => Some(self.upload(file, &identity.uid).await?),
            None => None,
        };

        self.set_phase(ComposerPhase::Persisting);
        let nickname = self.author_nickname(&identity).await;
        let card = NewCard {
            content,
            owner_id: identity.uid,
            season: self.season,
            display_name: identity.display_name,
            nickname,
            attachment,
        };
        self.cards.create(card).await
    }

    async fn upload(&mut self, file: AttachmentFile, owner_id: &str) -> Result<Attachment> {
        self.set_phase(ComposerPhase::Uploading { progress: 0 });
        let label = file.name.clone();
        let media_kind = file.media_type.clone();

        let task = self.uploader.upload(file, owner_id)?;
        let url = task
            .finish(|progress| self.set_phase(ComposerPhase::Uploading { progress }))
            .await?;

        Ok(Attachment {
            url,
            media_kind,
            label,
        })
    }

    /// A missing or unreadable profile only means no nickname on the card.
    async fn author_nickname(&self, identity: &Identity) -> Option<String> {
        let profiles = self.profiles.as_ref()?;
        match profiles.find_by_id(&identity.uid).await {
            Ok(profile) => profile.and_then(|p| p.nickname),
            Err(e) => {
                tracing::warn!("[Composer] Could not read profile of {}: {}", identity.uid, e);
                None
            }
        }
    }

    fn set_phase(&mut self, phase: ComposerPhase) {
        if self.phase == phase {
            return;
        }
        tracing::debug!("[Composer] {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        let current = &self.phase;
        self.observers.retain(|tx| tx.send(current.clone()).is_ok());
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> &ComposerPhase {
        &self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn attachment(&self) -> Option<&AttachmentFile> {
        self.attachment.as_ref()
    }
}
