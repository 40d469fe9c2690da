//! Per-atom progress transitions and capsule XP accounting.
//!
//! The tracker applies the client-side half of the progress model: status
//! moves optimistically when the user acts, the server's verdict settles
//! it, and a reset snaps it back. Reward XP is announced on the event bus
//! exactly once per transition into `completed`.

use thiserror::Error;

use crate::catalog::Atom;
use crate::events::{ClientEvent, EventBus};
use crate::progress::status::ProgressStatus;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("atom {0} is locked")]
    Locked(String),
}

pub type Result<T> = std::result::Result<T, ProgressError>;

/// Client-side progress state for one atom.
///
/// `locked` is an overlay, not a stored status: it gates submissions but
/// the underlying status survives, so unlocking restores where the user
/// left off.
#[derive(Debug, Clone)]
pub struct AtomProgress {
    pub atom_id: String,
    pub molecule_id: String,
    pub status: ProgressStatus,
    pub locked: bool,
    pub reward_xp: i64,
    graded: bool,
    /// Guards against announcing the same reward twice in one session.
    reward_granted: bool,
}

impl AtomProgress {
    /// Hydrate from a normalized atom.
    ///
    /// An atom that arrives already `completed` has its reward marked as
    /// granted so a refetch never replays the XP announcement.
    pub fn from_atom(atom: &Atom) -> Self {
        Self {
            atom_id: atom.id.clone(),
            molecule_id: atom.molecule_id.clone(),
            status: atom.progress_status,
            locked: atom.is_locked,
            reward_xp: atom.reward_xp,
            graded: atom.content_type.is_graded(),
            reward_granted: atom.progress_status == ProgressStatus::Completed,
        }
    }

    /// Status as shown to the user, with the lock overlay applied.
    pub fn effective_status(&self) -> ProgressStatus {
        if self.locked {
            ProgressStatus::Locked
        } else {
            self.status
        }
    }

    /// Record that an answer is about to be submitted.
    ///
    /// Moves `not_started` and `failed` to `in_progress` before the server
    /// acknowledges anything; `completed` is sticky and stays put.
    pub fn begin_submission(&mut self) -> Result<()> {
        if self.locked {
            return Err(ProgressError::Locked(self.atom_id.clone()));
        }

        match self.status {
            ProgressStatus::NotStarted | ProgressStatus::Failed => {
                self.status = ProgressStatus::InProgress;
            }
            _ => {}
        }
        Ok(())
    }

    /// Settle the status from a delivered verdict.
    ///
    /// Ungraded atoms complete on delivery regardless of the verdict flag.
    /// Graded atoms complete on a correct answer and fail otherwise.
    /// A `completed` atom never downgrades.
    pub fn record_verdict(&mut self, is_correct: bool, bus: &EventBus) {
        if self.status == ProgressStatus::Completed {
            return;
        }

        if !self.graded || is_correct {
            self.complete(bus);
        } else {
            self.status = ProgressStatus::Failed;
        }
    }

    /// Mark complete without a verdict (lessons, manual completion).
    pub fn force_complete(&mut self, bus: &EventBus) -> Result<()> {
        if self.locked {
            return Err(ProgressError::Locked(self.atom_id.clone()));
        }
        if self.status != ProgressStatus::Completed {
            self.complete(bus);
        }
        Ok(())
    }

    /// Apply a server-acknowledged reset.
    ///
    /// Clears the reward guard: after a reset the server re-grants XP on
    /// the next completion, so the announcement replays too.
    pub fn apply_reset(&mut self) {
        self.status = ProgressStatus::NotStarted;
        self.reward_granted = false;
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    fn complete(&mut self, bus: &EventBus) {
        self.status = ProgressStatus::Completed;
        bus.emit(ClientEvent::AtomCompleted {
            atom_id: self.atom_id.clone(),
            molecule_id: self.molecule_id.clone(),
        });

        if !self.reward_granted && self.reward_xp > 0 {
            self.reward_granted = true;
            bus.emit(ClientEvent::XpAwarded {
                atom_id: self.atom_id.clone(),
                amount: self.reward_xp,
            });
        }
    }
}

/// Capsule-level XP tally.
#[derive(Debug, Clone, Copy)]
pub struct CapsuleXp {
    pub current: i64,
    pub target: i64,
}

impl CapsuleXp {
    /// Build a tally, falling back to the default target when the server
    /// sent none (or zero).
    pub fn new(current: i64, target: i64) -> Self {
        let target = if target > 0 {
            target
        } else {
            crate::catalog::DEFAULT_XP_TARGET
        };
        Self {
            current: current.max(0),
            target,
        }
    }

    pub fn percentage(&self) -> f64 {
        super::status::xp_percentage(self.current as f64, self.target as f64)
    }

    pub fn status(&self) -> ProgressStatus {
        super::status::derive_capsule_status(self.current as f64, self.percentage())
    }

    /// Add awarded XP to the running total.
    pub fn award(&mut self, amount: i64) {
        self.current = (self.current + amount).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ContentType;

    fn quiz_atom(status: ProgressStatus) -> Atom {
        Atom {
            id: "a1".to_string(),
            content_type: ContentType::Quiz,
            progress_status: status,
            reward_xp: 50,
            molecule_id: "m1".to_string(),
            ..Atom::default()
        }
    }

    #[test]
    fn test_first_submission_moves_to_in_progress() {
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::NotStarted));
        progress.begin_submission().unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
    }

    #[test]
    fn test_retry_after_failure_moves_to_in_progress() {
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::Failed));
        progress.begin_submission().unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
    }

    #[test]
    fn test_locked_atom_rejects_submission() {
        let mut atom = quiz_atom(ProgressStatus::NotStarted);
        atom.is_locked = true;
        let mut progress = AtomProgress::from_atom(&atom);
        assert!(matches!(
            progress.begin_submission(),
            Err(ProgressError::Locked(_))
        ));
        assert_eq!(progress.effective_status(), ProgressStatus::Locked);
    }

    #[test]
    fn test_unlocking_restores_underlying_status() {
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::InProgress));

        progress.set_locked(true);
        assert_eq!(progress.effective_status(), ProgressStatus::Locked);
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert!(progress.begin_submission().is_err());

        progress.set_locked(false);
        assert_eq!(progress.effective_status(), ProgressStatus::InProgress);
        progress.begin_submission().unwrap();
    }

    #[test]
    fn test_correct_verdict_completes_and_awards_once() {
        let (bus, mut rx) = EventBus::channel();
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::NotStarted));
        progress.begin_submission().unwrap();
        progress.record_verdict(true, &bus);

        assert_eq!(progress.status, ProgressStatus::Completed);
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::AtomCompleted {
                atom_id: "a1".to_string(),
                molecule_id: "m1".to_string(),
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::XpAwarded {
                atom_id: "a1".to_string(),
                amount: 50,
            }
        );

        // Answering again after completion changes nothing
        progress.record_verdict(true, &bus);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_incorrect_verdict_fails_graded_atom() {
        let (bus, mut rx) = EventBus::channel();
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::NotStarted));
        progress.begin_submission().unwrap();
        progress.record_verdict(false, &bus);

        assert_eq!(progress.status, ProgressStatus::Failed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_ungraded_atom_completes_on_any_verdict() {
        let (bus, _rx) = EventBus::channel();
        let mut atom = quiz_atom(ProgressStatus::NotStarted);
        atom.content_type = ContentType::Writing;
        let mut progress = AtomProgress::from_atom(&atom);
        progress.begin_submission().unwrap();
        progress.record_verdict(false, &bus);
        assert_eq!(progress.status, ProgressStatus::Completed);
    }

    #[test]
    fn test_hydrated_completed_atom_never_replays_reward() {
        let (bus, mut rx) = EventBus::channel();
        let mut progress = AtomProgress::from_atom(&quiz_atom(ProgressStatus::Completed));
        progress.record_verdict(true, &bus);
        assert!(rx.try_recv().is_err());

        // A reset clears the guard, so re-completing re-announces
        progress.apply_reset();
        assert_eq!(progress.status, ProgressStatus::NotStarted);
        progress.begin_submission().unwrap();
        progress.record_verdict(true, &bus);
        assert_eq!(rx.try_recv().unwrap().name(), "nanshe:atom-completed");
        assert_eq!(rx.try_recv().unwrap().name(), "nanshe:xp-awarded");
    }

    #[test]
    fn test_force_complete_marks_lesson_read() {
        let (bus, mut rx) = EventBus::channel();
        let mut atom = quiz_atom(ProgressStatus::NotStarted);
        atom.content_type = ContentType::Lesson;
        let mut progress = AtomProgress::from_atom(&atom);
        progress.force_complete(&bus).unwrap();
        assert_eq!(progress.status, ProgressStatus::Completed);
        assert_eq!(rx.try_recv().unwrap().name(), "nanshe:atom-completed");
    }

    #[test]
    fn test_zero_reward_completes_without_xp_event() {
        let (bus, mut rx) = EventBus::channel();
        let mut atom = quiz_atom(ProgressStatus::NotStarted);
        atom.reward_xp = 0;
        let mut progress = AtomProgress::from_atom(&atom);
        progress.begin_submission().unwrap();
        progress.record_verdict(true, &bus);
        assert_eq!(rx.try_recv().unwrap().name(), "nanshe:atom-completed");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_capsule_xp_accounting() {
        let mut xp = CapsuleXp::new(3000, 0);
        assert_eq!(xp.target, 6000);
        assert_eq!(xp.percentage(), 50.0);
        assert_eq!(xp.status(), ProgressStatus::InProgress);

        xp.award(3000);
        assert_eq!(xp.percentage(), 100.0);
        assert_eq!(xp.status(), ProgressStatus::Completed);

        xp.award(500);
        assert_eq!(xp.percentage(), 100.0);
    }
}
