//! Exercise session lifecycle.
//!
//! One session wraps one atom for one load: Unanswered → Submitting →
//! Answered, and back to Unanswered only through a server-acknowledged
//! reset. At most one submission per load; the Answered phase swallows
//! further submits, and a delivery failure parks the session in Answered
//! with the error as feedback until the user resets.

use async_trait::async_trait;

use crate::api::ApiError;
use crate::catalog::Atom;
use crate::events::EventBus;
use crate::exercises::controller::{self, ExerciseError, Result};
use crate::exercises::models::{AnswerDraft, AnswerSubmission, ExerciseKind, SentenceMode, Verdict};
use crate::progress::{AtomProgress, ProgressError};

/// Backend seam for answer delivery, kept narrow so sessions are
/// testable without HTTP.
#[async_trait]
pub trait AnswerTransport: Send + Sync {
    async fn submit_answer(&self, submission: &AnswerSubmission)
        -> std::result::Result<Verdict, ApiError>;
    async fn reset_atom(&self, atom_id: &str) -> std::result::Result<(), ApiError>;
}

// Lets a session borrow a shared client instead of owning it
#[async_trait]
impl<T: AnswerTransport + ?Sized> AnswerTransport for &T {
    async fn submit_answer(
        &self,
        submission: &AnswerSubmission,
    ) -> std::result::Result<Verdict, ApiError> {
        (**self).submit_answer(submission).await
    }

    async fn reset_atom(&self, atom_id: &str) -> std::result::Result<(), ApiError> {
        (**self).reset_atom(atom_id).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExercisePhase {
    Unanswered,
    Submitting,
    Answered(Verdict),
    Resetting,
}

pub struct ExerciseSession<T: AnswerTransport> {
    atom_id: String,
    kind: ExerciseKind,
    draft: AnswerDraft,
    phase: ExercisePhase,
    /// True when the last verdict is a local stand-in for a failed
    /// delivery rather than a server ruling.
    delivery_failed: bool,
    progress: AtomProgress,
    transport: T,
    bus: EventBus,
}

impl<T: AnswerTransport> ExerciseSession<T> {
    /// Open a session on an atom. The exercise kind is resolved from the
    /// payload here, once, and never re-evaluated.
    pub fn new(atom: &Atom, transport: T, bus: EventBus) -> Result<Self> {
        let kind = ExerciseKind::from_atom(atom).ok_or(ExerciseError::UnsupportedContent)?;
        let draft = controller::initial_draft(&kind);
        Ok(Self {
            atom_id: atom.id.clone(),
            kind,
            draft,
            phase: ExercisePhase::Unanswered,
            delivery_failed: false,
            progress: AtomProgress::from_atom(atom),
            transport,
            bus,
        })
    }

    pub fn atom_id(&self) -> &str {
        &self.atom_id
    }

    pub fn kind(&self) -> &ExerciseKind {
        &self.kind
    }

    pub fn phase(&self) -> &ExercisePhase {
        &self.phase
    }

    pub fn draft(&self) -> &AnswerDraft {
        &self.draft
    }

    pub fn progress(&self) -> &AtomProgress {
        &self.progress
    }

    pub fn delivery_failed(&self) -> bool {
        self.delivery_failed
    }

    /// Whether submit would currently go through.
    pub fn can_submit(&self) -> bool {
        self.phase == ExercisePhase::Unanswered
            && !self.progress.locked
            && controller::validate(&self.kind, &self.draft).is_ok()
    }

    // ==================== Draft input ====================
    //
    // All input is accepted only while Unanswered; the UI disables
    // controls in other phases and the machine enforces it here.

    /// Replace the whole draft.
    pub fn set_draft(&mut self, draft: AnswerDraft) -> bool {
        if !self.accepts_input() {
            return false;
        }
        self.draft = draft;
        true
    }

    /// Select an option by text (multiple choice and sentence-choice).
    /// Unknown options are refused.
    pub fn select_option(&mut self, text: &str) -> bool {
        if !self.accepts_input() || !self.offers_option(text) {
            return false;
        }
        let AnswerDraft::Selection { selected } = &mut self.draft else {
            return false;
        };
        *selected = Some(text.to_string());
        true
    }

    /// Fill one blank.
    pub fn set_blank(&mut self, index: usize, text: &str) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let AnswerDraft::Blanks { values } = &mut self.draft else {
            return false;
        };
        match values.get_mut(index) {
            Some(value) => {
                *value = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Move an item within an ordering draft.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if !self.accepts_input() {
            return false;
        }
        controller::move_item(&mut self.draft, from, to)
    }

    /// Drop an answer chip on a prompt slot.
    pub fn place_answer(&mut self, prompt_index: usize, answer: &str) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let ExerciseKind::Association(exercise) = &self.kind else {
            return false;
        };
        controller::place_answer(exercise, &mut self.draft, prompt_index, answer)
    }

    /// Return a placed chip to the pool.
    pub fn clear_binding(&mut self, prompt_index: usize) -> bool {
        if !self.accepts_input() {
            return false;
        }
        controller::clear_binding(&mut self.draft, prompt_index)
    }

    /// Replace the free text of a writing draft.
    pub fn set_text(&mut self, text: &str) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let AnswerDraft::FreeText { text: current } = &mut self.draft else {
            return false;
        };
        *current = text.to_string();
        true
    }

    /// Chips not yet placed (association only).
    pub fn available_pool(&self) -> Vec<&str> {
        match &self.kind {
            ExerciseKind::Association(exercise) => {
                controller::available_pool(exercise, &self.draft)
            }
            _ => Vec::new(),
        }
    }

    // ==================== Lifecycle ====================

    /// Submit the current draft.
    ///
    /// Returns `Ok(None)` when the phase swallows the submit (already
    /// answered, or a submission in flight). A transport failure does not
    /// error: it surfaces as a local incorrect verdict carrying the error
    /// message, and a reset is required before retrying.
    pub async fn submit(&mut self) -> Result<Option<Verdict>> {
        if self.phase != ExercisePhase::Unanswered {
            return Ok(None);
        }
        if self.progress.locked {
            return Err(ProgressError::Locked(self.atom_id.clone()).into());
        }

        // Validation failures block locally before any state moves
        let submission = controller::build_submission(&self.atom_id, &self.kind, &self.draft)?;
        self.progress.begin_submission()?;
        self.phase = ExercisePhase::Submitting;

        let verdict = match self.transport.submit_answer(&submission).await {
            Ok(verdict) => {
                self.delivery_failed = false;
                self.progress.record_verdict(verdict.is_correct, &self.bus);
                verdict
            }
            Err(err) => {
                log::warn!(
                    "exercises: answer delivery failed for atom {}: {}",
                    self.atom_id,
                    err
                );
                self.delivery_failed = true;
                Verdict {
                    is_correct: false,
                    feedback: err.to_string(),
                }
            }
        };

        self.phase = ExercisePhase::Answered(verdict.clone());
        Ok(Some(verdict))
    }

    /// Reset the atom on the server and return to Unanswered.
    ///
    /// Resets are server-authoritative: local state only moves after the
    /// server acknowledges. Also recovers a session stuck in Submitting
    /// after its delivery future was dropped.
    pub async fn reset(&mut self) -> Result<()> {
        match self.phase {
            ExercisePhase::Unanswered | ExercisePhase::Resetting => return Ok(()),
            ExercisePhase::Answered(_) | ExercisePhase::Submitting => {}
        }

        let prior = std::mem::replace(&mut self.phase, ExercisePhase::Resetting);
        match self.transport.reset_atom(&self.atom_id).await {
            Ok(()) => {
                self.progress.apply_reset();
                self.draft = controller::initial_draft(&self.kind);
                self.delivery_failed = false;
                self.phase = ExercisePhase::Unanswered;
                Ok(())
            }
            Err(err) => {
                self.phase = prior;
                Err(ExerciseError::Reset(err))
            }
        }
    }

    fn accepts_input(&self) -> bool {
        self.phase == ExercisePhase::Unanswered
    }

    fn offers_option(&self, text: &str) -> bool {
        match &self.kind {
            ExerciseKind::Qcm(exercise) => exercise.option_index(text).is_some(),
            ExerciseKind::SentenceConstruction(exercise) => match &exercise.mode {
                SentenceMode::Choice(choices) => choices.iter().any(|c| c == text),
                SentenceMode::WordOrder(_) => false,
            },
            _ => false,
        }
    }
}
