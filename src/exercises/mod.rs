//! Interactive exercise machinery
//!
//! This module provides:
//! - Exercise definitions resolved once from atom payloads
//! - Per-kind draft validation and submission payload building
//! - The session lifecycle machine (Unanswered → Submitting → Answered)

pub mod controller;
pub mod models;
pub mod session;

pub use controller::{ExerciseError, initial_draft, validate};
pub use models::{
    AnswerDraft, AnswerSubmission, AssociationExercise, AssociationPair, ExerciseKind,
    FillInBlankExercise, QcmExercise, ReorderExercise, SentenceConstructionExercise,
    SentenceMode, Verdict, WritingExercise, normalize_verdict,
};
pub use session::{AnswerTransport, ExercisePhase, ExerciseSession};
