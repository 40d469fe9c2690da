//! Review session flow.
//!
//! The server owns everything about spacing: which card comes next, how
//! many remain, when cards fall due. The client walks a fixed loop per
//! card (show prompt, reveal answer, send rating) and replaces its whole
//! session snapshot from each response. No queue advancement or due-date
//! math happens locally.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;
use crate::srs::models::{
    normalize_srs_session, ReviewRating, ReviewSubmission, SrsItem, SrsSession,
};

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("a review session is already running")]
    AlreadyActive,
    #[error("no card is being reviewed")]
    NotReviewing,
    #[error("the answer has not been revealed")]
    NotRevealed,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, ReviewError>;

/// Backend seam for the review loop.
#[async_trait]
pub trait SrsTransport: Send + Sync {
    /// Start a session, optionally scoped to one capsule. Returns the raw
    /// session payload.
    async fn start_srs_session(
        &self,
        capsule_id: Option<&str>,
    ) -> std::result::Result<Value, ApiError>;

    /// Submit one rating. Returns the raw next-session payload.
    async fn submit_srs_review(
        &self,
        review: &ReviewSubmission,
    ) -> std::result::Result<Value, ApiError>;
}

// Lets a flow borrow a shared client instead of owning it
#[async_trait]
impl<T: SrsTransport + ?Sized> SrsTransport for &T {
    async fn start_srs_session(
        &self,
        capsule_id: Option<&str>,
    ) -> std::result::Result<Value, ApiError> {
        (**self).start_srs_session(capsule_id).await
    }

    async fn submit_srs_review(
        &self,
        review: &ReviewSubmission,
    ) -> std::result::Result<Value, ApiError> {
        (**self).submit_srs_review(review).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    Idle,
    Loading,
    /// A card's prompt is on screen, answer hidden.
    Reviewing,
    /// The answer is shown; a rating is expected next.
    Revealed,
    Completed,
}

pub struct ReviewFlow<T: SrsTransport> {
    phase: ReviewPhase,
    session: Option<SrsSession>,
    transport: T,
}

impl<T: SrsTransport> ReviewFlow<T> {
    pub fn new(transport: T) -> Self {
        Self {
            phase: ReviewPhase::Idle,
            session: None,
            transport,
        }
    }

    pub fn phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&SrsSession> {
        self.session.as_ref()
    }

    /// The card currently on screen.
    pub fn current_item(&self) -> Option<&SrsItem> {
        match self.phase {
            ReviewPhase::Reviewing | ReviewPhase::Revealed => {
                self.session.as_ref().and_then(|s| s.item.as_ref())
            }
            _ => None,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.session.as_ref().map(|s| s.remaining).unwrap_or(0)
    }

    /// Start (or restart after completion) a review session.
    pub async fn start(&mut self, capsule_id: Option<&str>) -> Result<ReviewPhase> {
        match self.phase {
            ReviewPhase::Idle | ReviewPhase::Completed => {}
            _ => return Err(ReviewError::AlreadyActive),
        }

        self.phase = ReviewPhase::Loading;
        match self.transport.start_srs_session(capsule_id).await {
            Ok(raw) => {
                let session = normalize_srs_session(&raw, "");
                log::info!(
                    "srs: session {} started, {} remaining",
                    session.session_id,
                    session.remaining
                );
                self.apply_session(session);
                Ok(self.phase)
            }
            Err(err) => {
                self.phase = ReviewPhase::Idle;
                self.session = None;
                Err(err.into())
            }
        }
    }

    /// Show the answer for the current card. Local only.
    pub fn reveal(&mut self) -> Result<()> {
        if self.phase != ReviewPhase::Reviewing {
            return Err(ReviewError::NotReviewing);
        }
        self.phase = ReviewPhase::Revealed;
        Ok(())
    }

    /// Send the rating for the revealed card and move to whatever the
    /// server returns next. A failed send stays on the revealed card so
    /// the rating can be retried.
    pub async fn rate(&mut self, rating: ReviewRating) -> Result<ReviewPhase> {
        if self.phase != ReviewPhase::Revealed {
            return Err(ReviewError::NotRevealed);
        }

        // Both of these exist in Revealed; reaching it requires an item
        let (session_id, item_id) = match self.session.as_ref().and_then(|s| {
            s.item
                .as_ref()
                .map(|item| (s.session_id.clone(), item.id.clone()))
        }) {
            Some(ids) => ids,
            None => return Err(ReviewError::NotReviewing),
        };

        let review = ReviewSubmission::new(&session_id, &item_id, rating);
        self.phase = ReviewPhase::Loading;
        match self.transport.submit_srs_review(&review).await {
            Ok(raw) => {
                // The id stays sticky across responses that omit it
                let session = normalize_srs_session(&raw, &session_id);
                self.apply_session(session);
                Ok(self.phase)
            }
            Err(err) => {
                self.phase = ReviewPhase::Revealed;
                Err(err.into())
            }
        }
    }

    fn apply_session(&mut self, session: SrsSession) {
        self.phase = if session.item.is_some() {
            ReviewPhase::Reviewing
        } else {
            if session.remaining > 0 {
                log::warn!(
                    "srs: session {} reports {} remaining but returned no item",
                    session.session_id,
                    session.remaining
                );
            }
            ReviewPhase::Completed
        };
        self.session = Some(session);
    }
}
