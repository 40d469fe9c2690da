//! Client core for the Nanshe learning platform.
//!
//! The backend grew through several API generations, so every payload
//! that enters this crate goes through a normalization layer before the
//! typed model sees it. On top of that model sit the progress tracker,
//! the exercise state machines, the SRS review flow, and the journal.
//!
//! Layers, bottom to top:
//! - `normalize`: tolerant JSON coercion and field probing
//! - `catalog`: capsule / granule / molecule / atom tree
//! - `progress`: status model, XP accounting, completion events
//! - `exercises`: per-kind drafts, validation, submission lifecycle
//! - `srs`: server-driven spaced-repetition review loop
//! - `journal`: learner notes with derived summaries
//! - `api`: reqwest client with legacy path fallback
//! - `cache` / `config` / `events`: ambient plumbing

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod events;
pub mod exercises;
pub mod journal;
pub mod normalize;
pub mod progress;
pub mod srs;

pub use api::{ApiClient, ApiError};
pub use cache::QueryCache;
pub use catalog::{Atom, AtomBatch, Capsule, ContentType, GenerationStatus, Granule, Molecule};
pub use config::ClientConfig;
pub use events::{ClientEvent, EventBus};
pub use exercises::{AnswerTransport, ExerciseKind, ExerciseSession, Verdict};
pub use journal::{JournalDraft, JournalEntry, JournalTransport};
pub use progress::{AtomProgress, CapsuleXp, ProgressStatus};
pub use srs::{ReviewFlow, ReviewRating, SrsSession, SrsTransport};
